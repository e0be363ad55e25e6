//! CLI 命令行参数解析
//!
//! 使用 clap 定义命令行接口

use clap::{Args, Parser, Subcommand};

/// mcphub - publish MCP servers with a quality scan and install them into VS Code
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mcphub",
    about = "Register, analyse, publish and install MCP servers",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log filter, e.g. `debug` or `mcphub=trace` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create mcphub.json for the server in the current directory
    Init(InitArgs),

    /// Analyse the server with SonarCloud and publish it to the registry
    Push(PushArgs),

    /// Look up a server in the registry
    Search(SearchArgs),

    /// Fetch a server from the registry and add it to VS Code's mcp.json
    Pull(PullArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Server name
    #[arg(long)]
    pub name: Option<String>,
    /// Semantic version
    #[arg(long = "version", value_name = "SEMVER")]
    pub server_version: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    /// Implementation language
    #[arg(long)]
    pub lang: Option<String>,
    #[arg(long)]
    pub license: Option<String>,
    /// Entrypoint file, relative to the project root
    #[arg(long)]
    pub entrypoint: Option<String>,
    /// GitHub repository URL
    #[arg(long)]
    pub repository: Option<String>,
    /// Do not prompt; take flags and defaults and replace an existing mcphub.json
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PushArgs {
    /// Server name (defaults to the name in mcphub.json)
    #[arg(long)]
    pub name: Option<String>,
    /// Overwrite an existing registry record without asking
    #[arg(long)]
    pub force: bool,
    /// Registry bucket (defaults to S3_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Server name
    #[arg(long)]
    pub name: String,
    /// Registry bucket (defaults to S3_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PullArgs {
    /// Server name
    #[arg(long)]
    pub name: String,
    /// Registry bucket (defaults to S3_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,
    /// Replace a differing VS Code entry without asking
    #[arg(long)]
    pub force: bool,
}
