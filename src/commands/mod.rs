//! CLI 命令处理模块
//!
//! 处理所有命令行接口的解析和路由

pub mod init;
pub mod parser;
pub mod pull;
pub mod push;
pub mod search;

// Re-exports (used by main.rs)
pub use parser::*;

use crate::error::McpHubResult;
use crate::prompt::{Confirmer, Decline, TerminalPrompter};
use crate::registry::{RegistryClient, S3Store};
use crate::utils::{env::load_env_file, ProjectPaths, Settings};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// What every command runs against: the project directory and the
/// environment after `.env` has been applied.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub paths: ProjectPaths,
    pub settings: Settings,
    /// Whether a user is at the terminal to answer prompts.
    pub interactive: bool,
}

impl CommandContext {
    /// Context for the current directory.
    pub fn from_current_dir() -> McpHubResult<Self> {
        let paths = ProjectPaths::current()?;
        load_env_file(&paths.env_file);
        Ok(Self {
            settings: Settings::from_env(),
            interactive: console::user_attended(),
            paths,
        })
    }

    /// Terminal confirmations when attended; otherwise every question is
    /// answered "no".
    pub fn confirmer(&self) -> Box<dyn Confirmer> {
        if self.interactive {
            Box::new(TerminalPrompter)
        } else {
            Box::new(Decline)
        }
    }

    /// Registry client for `--bucket` or the configured default bucket.
    pub fn registry(&self, bucket: Option<String>) -> McpHubResult<(String, RegistryClient)> {
        let bucket = self.settings.bucket(bucket)?;
        let store = S3Store::new(self.settings.s3(bucket.clone())?)?;
        Ok((bucket, RegistryClient::new(Arc::new(store))))
    }
}

/// Run one parsed command.
pub async fn dispatch(command: Commands) -> McpHubResult<()> {
    let context = CommandContext::from_current_dir()?;
    match command {
        Commands::Init(args) => init::execute(args, &context),
        Commands::Push(args) => push::execute(args, &context).await,
        Commands::Search(args) => search::execute(args, &context).await,
        Commands::Pull(args) => pull::execute(args, &context).await,
    }
}

pub(crate) fn spinner(message: impl Into<String>) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let spinner = ProgressBar::new_spinner()
        .with_style(style)
        .with_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
