use super::{spinner, CommandContext, SearchArgs};
use crate::error::McpHubResult;
use crate::registry::RegistryRecord;
use colored::Colorize;

pub async fn execute(args: SearchArgs, context: &CommandContext) -> McpHubResult<()> {
    let (bucket, registry) = context.registry(args.bucket)?;

    let progress = spinner(format!("Searching for '{}' in bucket '{}'...", args.name, bucket));
    let result = registry.search(&args.name).await;
    progress.finish_and_clear();

    print_record(&result?);
    Ok(())
}

pub fn print_record(record: &RegistryRecord) {
    println!("{} Found server: {}", "✅".green(), record.name.cyan().bold());
    println!("   Version:     {}", record.version);
    println!("   Description: {}", record.description);
    println!("   Author:      {}", record.author);
    println!("   Language:    {}", record.language);
    println!("   License:     {}", record.license);
    println!("   Entrypoint:  {}", record.entrypoint);
    println!("   Repository:  {}", record.repository_url());
    if let Some(analysis) = &record.analysis {
        println!(
            "   Analysis:    {} issues ({} bugs, {} vulnerabilities, {} hotspots) on {}",
            analysis.counts.total_issues,
            analysis.counts.bugs,
            analysis.counts.vulnerabilities,
            analysis.counts.security_hotspots,
            analysis.analysed_at.format("%Y-%m-%d")
        );
        println!("   Dashboard:   {}", analysis.dashboard_url);
    }
    println!(
        "   Published:   {} (updated {})",
        record.meta.created_at.format("%Y-%m-%d %H:%M"),
        record.meta.updated_at.format("%Y-%m-%d %H:%M")
    );
}
