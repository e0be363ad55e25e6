//! `mcphub push`: existence check, analysis, upload.
//!
//! A failed or timed-out analysis never reaches the upload step. Whatever
//! report was written under `reports/` stays there.

use super::{spinner, CommandContext, PushArgs};
use crate::analysis::report::{print_summary, ReportWriter};
use crate::analysis::scanner::SonarScanner;
use crate::analysis::sonar::SonarCloudService;
use crate::analysis::AnalysisRunner;
use crate::descriptor::validation::validate_name;
use crate::descriptor::{DescriptorStore, RepositoryRef, ServerDescriptor};
use crate::editor::invocation_url;
use crate::error::{errors, McpHubResult};
use crate::prompt::{Confirmer, Prompter, TerminalPrompter};
use crate::registry::{PushAck, RegistryClient, RegistryRecord};
use chrono::Utc;
use colored::Colorize;
use tracing::info;

pub async fn execute(args: PushArgs, context: &CommandContext) -> McpHubResult<()> {
    let descriptor = resolve_descriptor(&args, context)?;

    let (bucket, registry) = context.registry(args.bucket.clone())?;
    let credentials = context.settings.sonar()?;
    let service = SonarCloudService::new(credentials, Box::new(SonarScanner::default()))?;
    let runner = AnalysisRunner::new(
        Box::new(service),
        ReportWriter::new(context.paths.clone()),
    );
    let invocation_base = context.settings.lambda_base_url.clone();
    let confirmer = context.confirmer();

    println!(
        "\n🔍 Checking if server '{}' exists in bucket '{}'...",
        descriptor.name.cyan(),
        bucket
    );
    let ack = push_server(
        &descriptor,
        args.force,
        &registry,
        &runner,
        confirmer.as_ref(),
        invocation_base.as_deref(),
    )
    .await?;

    println!("\n{}", "=".repeat(70));
    println!("{}", "✅ Success!".green().bold());
    println!("{}", "=".repeat(70));
    let verb = if ack.replaced { "updated in" } else { "added to" };
    println!(
        "\n{} Server '{}' {} s3://{}/{}",
        "✅".green(),
        ack.record.name.cyan(),
        verb,
        bucket,
        ack.key
    );
    if let Some(analysis) = &ack.record.analysis {
        println!("{} View analysis in SonarCloud: {}", "✅".green(), analysis.dashboard_url);
    }
    println!("\n💡 The full SonarCloud report is kept in ./reports, only the summary is published");
    Ok(())
}

/// The push workflow against already-built components.
pub async fn push_server(
    descriptor: &ServerDescriptor,
    force: bool,
    registry: &RegistryClient,
    runner: &AnalysisRunner,
    confirmer: &dyn Confirmer,
    invocation_base: Option<&str>,
) -> McpHubResult<PushAck> {
    let plan = registry
        .prepare_push(&descriptor.name, force, confirmer)
        .await?;
    if plan.replacing {
        println!("⚠️  Server '{}' will be overwritten", descriptor.name);
    }

    println!(
        "\n🚀 Starting SonarCloud analysis for {}...",
        descriptor.repository_url()
    );
    let progress = spinner("Analysing (this can take a few minutes)...");
    let analysis = runner.run(descriptor).await;
    progress.finish_and_clear();
    let report = analysis?;

    print_summary(&report.document);
    println!("\n📁 Report saved to: {}", report.report_path.display());

    if descriptor.pricing.is_some() {
        println!("\n💡 Note: Pricing information is stored locally only, not pushed to the registry");
    }

    let record = RegistryRecord::from_descriptor(
        descriptor,
        Some(&report),
        invocation_base.map(|base| invocation_url(base, &descriptor.name)),
        Utc::now(),
    );
    info!("Uploading record for {}", descriptor.name);
    registry.upload(plan, record).await
}

/// mcphub.json, optionally renamed by `--name`; without a descriptor the
/// fields are asked for interactively.
fn resolve_descriptor(args: &PushArgs, context: &CommandContext) -> McpHubResult<ServerDescriptor> {
    let store = DescriptorStore::new(context.paths.clone());
    let flag_name = args.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    match store.load()? {
        Some(mut descriptor) => {
            println!("📄 Found mcphub.json configuration");
            match flag_name {
                Some(name) => descriptor.name = name.to_string(),
                None => println!("📦 Using name from config: {}", descriptor.name.cyan()),
            }
            checked_name(&descriptor.name)?;
            Ok(descriptor)
        }
        None => {
            let name = flag_name.ok_or_else(|| {
                errors::validation_error(
                    "--name required (or create mcphub.json with 'mcphub init')",
                    Some("name"),
                )
            })?;
            checked_name(name)?;
            if !context.interactive {
                return Err(errors::validation_error(
                    "mcphub.json not found; run 'mcphub init' first",
                    None,
                ));
            }
            println!("\n📝 Please provide information for server '{}':", name);
            collect_descriptor(&mut TerminalPrompter, name.to_string())
        }
    }
}

fn checked_name(name: &str) -> McpHubResult<()> {
    validate_name(name).map_err(|reason| errors::validation_error(reason, Some("name")))
}

/// Ask for the fields push needs when the project has no mcphub.json.
pub fn collect_descriptor(prompter: &mut dyn Prompter, name: String) -> McpHubResult<ServerDescriptor> {
    checked_name(&name)?;
    let version = prompter.input("Version", Some("1.0.0"))?;
    let description = prompter.input("Description", Some(""))?;
    let author = prompter.input("Author", Some(""))?;
    let language = prompter.input("Language", Some("Python"))?;
    let license = prompter.input("License", Some("MIT"))?;
    let entrypoint = prompter.input("Entrypoint file", Some("main.py"))?;
    let repository_url = prompter.input("Repository URL (GitHub)", None)?;
    if repository_url.trim().is_empty() {
        return Err(errors::validation_error("a repository URL is required", Some("repository")));
    }

    Ok(ServerDescriptor {
        name,
        version,
        description,
        author,
        language,
        license,
        entrypoint,
        repository: RepositoryRef::git(repository_url),
        pricing: None,
    })
}
