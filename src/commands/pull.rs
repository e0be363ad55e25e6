use super::{spinner, CommandContext, PullArgs};
use crate::editor::{EditorConfig, EditorIntegrator, EntryChange, Os};
use crate::error::McpHubResult;
use colored::Colorize;

pub async fn execute(args: PullArgs, context: &CommandContext) -> McpHubResult<()> {
    let base_url = context.settings.lambda_base_url()?;
    let (bucket, registry) = context.registry(args.bucket)?;
    let os = Os::current()?;
    let integrator = EditorIntegrator::new(base_url, EditorConfig::for_os(os)?);

    let progress = spinner(format!("Fetching '{}' from bucket '{}'...", args.name, bucket));
    let result = registry.pull(&args.name).await;
    progress.finish_and_clear();
    let record = result?;

    println!("{} Found server: {}", "✅".green(), record.name.cyan());
    println!("   Description: {}", record.description);
    println!("   Author: {}", record.author);
    println!("   Repository: {}", record.repository_url());

    let confirmer = context.confirmer();
    let integration = integrator.integrate(&record.name, args.force, confirmer.as_ref())?;

    println!("\n{}", "=".repeat(70));
    println!("{}", "✅ Success!".green().bold());
    println!("{}", "=".repeat(70));
    let outcome = match integration.change {
        EntryChange::Added => "added to",
        EntryChange::Updated => "updated in",
        EntryChange::Unchanged => "already up to date in",
    };
    println!(
        "\n{} Server '{}' {} VS Code mcp.json",
        "✅".green(),
        record.name.cyan(),
        outcome
    );
    println!("{} URL: {}", "✅".green(), integration.entry.url);
    println!(
        "\n📍 Location ({}): {}",
        os.display_name(),
        integration.config_path.display()
    );
    println!("\n💡 Restart VS Code to load the new server");
    Ok(())
}
