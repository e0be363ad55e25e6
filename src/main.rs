use clap::Parser;
use colored::Colorize;
use mcphub::commands::{self, Cli};
use mcphub::error::McpHubError;
use mcphub::utils::logger;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志系统
    if let Err(err) = logger::init_logger(cli.log_level.as_deref()) {
        eprintln!("{} Invalid log filter: {}", "⚠️".yellow(), err);
    }

    match commands::dispatch(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn report_error(err: &McpHubError) {
    if let McpHubError::Aborted { reason } = err {
        println!("{} Aborted: {}", "❌".yellow(), reason);
        return;
    }

    let payload = err.to_user_facing();
    eprintln!("{} {}", "❌".red(), payload.title.red().bold());
    eprintln!("{}", payload.message);
    if let Some(hint) = payload.hint {
        eprintln!("{} {}", "💡".yellow(), hint);
    }
}
