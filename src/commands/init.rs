use super::{CommandContext, InitArgs};
use crate::descriptor::{DescriptorDraft, DescriptorStore, InitOptions};
use crate::error::McpHubResult;
use crate::prompt::{ScriptedPrompter, TerminalPrompter};
use colored::Colorize;

impl From<&InitArgs> for DescriptorDraft {
    fn from(args: &InitArgs) -> Self {
        Self {
            name: args.name.clone(),
            version: args.server_version.clone(),
            description: args.description.clone(),
            author: args.author.clone(),
            language: args.lang.clone(),
            license: args.license.clone(),
            entrypoint: args.entrypoint.clone(),
            repository_url: args.repository.clone(),
        }
    }
}

pub fn execute(args: InitArgs, context: &CommandContext) -> McpHubResult<()> {
    let store = DescriptorStore::new(context.paths.clone());
    let interactive = context.interactive && !args.yes;
    let options = InitOptions {
        draft: DescriptorDraft::from(&args),
        interactive,
        force: args.yes,
    };

    if interactive {
        println!("{}", "📝 Creating mcphub.json".bold());
    }

    let descriptor = if interactive {
        store.init(&mut TerminalPrompter, &options)?
    } else {
        store.init(&mut ScriptedPrompter::default(), &options)?
    };

    println!(
        "{} Created {} for {} v{}",
        "✅".green(),
        store.path().display(),
        descriptor.name.cyan(),
        descriptor.version
    );
    if descriptor.pricing.is_some() {
        println!("💡 Pricing is kept in mcphub.json only and is never pushed to the registry");
    }
    println!("\n💡 Next steps:");
    println!("   1. mcphub push --name {}", descriptor.name);
    println!("   2. mcphub pull --name {}", descriptor.name);
    Ok(())
}
