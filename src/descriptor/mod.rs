//! Project descriptor store
//!
//! Reads and writes `mcphub.json`, the local record of what an MCP server
//! is called and where its code lives. `init` collects the fields either
//! interactively or from flags; `load` is what `push` falls back to when no
//! `--name` is given.

pub mod types;
pub mod validation;

pub use types::{Pricing, RepositoryRef, ServerDescriptor};

use crate::analysis::project::GitHubRepo;
use crate::error::{errors, McpHubResult};
use crate::prompt::Prompter;
use crate::utils::ProjectPaths;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use types::{default_entrypoint, default_language, default_license, DEFAULT_VERSION};
use validation::Check;

/// A field answer may be rejected once; the second rejection in a row fails init.
pub const MAX_ATTEMPTS: usize = 2;

/// Values supplied up front (CLI flags). Missing values are prompted for in
/// interactive mode and are an error for required fields otherwise.
#[derive(Debug, Clone, Default)]
pub struct DescriptorDraft {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub entrypoint: Option<String>,
    pub repository_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub draft: DescriptorDraft,
    pub interactive: bool,
    /// Replace an existing descriptor without asking.
    pub force: bool,
}

/// Reads and writes the project's `mcphub.json`.
#[derive(Debug, Clone)]
pub struct DescriptorStore {
    paths: ProjectPaths,
}

impl DescriptorStore {
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths }
    }

    pub fn path(&self) -> &Path {
        &self.paths.descriptor_file
    }

    pub fn exists(&self) -> bool {
        self.paths.descriptor_file.is_file()
    }

    /// Read the descriptor; `Ok(None)` when the project has none yet.
    pub fn load(&self) -> McpHubResult<Option<ServerDescriptor>> {
        let path = &self.paths.descriptor_file;
        if !path.exists() {
            debug!("No descriptor at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .map_err(|err| errors::filesystem_error("Failed to read descriptor", path, err))?;
        let descriptor: ServerDescriptor = serde_json::from_str(&content).map_err(|err| {
            errors::validation_error(
                format!("{} is not a valid descriptor: {}", path.display(), err),
                None,
            )
        })?;
        Ok(Some(descriptor))
    }

    pub fn save(&self, descriptor: &ServerDescriptor) -> McpHubResult<()> {
        let path = &self.paths.descriptor_file;
        let content = serde_json::to_string_pretty(descriptor).map_err(|err| {
            errors::validation_error(format!("Failed to serialize descriptor: {err}"), None)
        })?;
        fs::write(path, content)
            .map_err(|err| errors::filesystem_error("Failed to write descriptor", path, err))?;
        info!("Wrote descriptor {}", path.display());
        Ok(())
    }

    /// Collect, validate and persist a new descriptor.
    pub fn init(
        &self,
        prompter: &mut dyn Prompter,
        options: &InitOptions,
    ) -> McpHubResult<ServerDescriptor> {
        if self.exists() && !options.force {
            if !options.interactive {
                return Err(errors::validation_error(
                    format!("{} already exists (use --force to replace it)", self.path().display()),
                    None,
                ));
            }
            let overwrite = prompter.ask_confirm("mcphub.json already exists. Overwrite it?", false)?;
            if !overwrite {
                return Err(errors::aborted("kept existing mcphub.json"));
            }
        }

        let descriptor = if options.interactive {
            self.collect_interactive(prompter, &options.draft)?
        } else {
            self.collect_from_draft(&options.draft)?
        };

        self.save(&descriptor)?;
        Ok(descriptor)
    }

    fn collect_interactive(
        &self,
        prompter: &mut dyn Prompter,
        draft: &DescriptorDraft,
    ) -> McpHubResult<ServerDescriptor> {
        let root = self.paths.root.clone();

        let repository_url = ask_validated(
            prompter,
            "Repository URL (GitHub)",
            Some(draft.repository_url.as_deref().unwrap_or("")),
            "repository",
            validation::validate_repository_url,
        )?;

        let default_name = draft
            .name
            .clone()
            .or_else(|| GitHubRepo::parse(&repository_url).map(|repo| repo.repo))
            .unwrap_or_else(|| self.paths.dir_name());
        let name = ask_validated(
            prompter,
            "Server name",
            Some(&default_name),
            "name",
            validation::validate_name,
        )?;
        let version = ask_validated(
            prompter,
            "Version",
            Some(draft.version.as_deref().unwrap_or(DEFAULT_VERSION)),
            "version",
            validation::validate_version,
        )?;

        let default_description = draft
            .description
            .clone()
            .unwrap_or_else(|| format!("MCP server for {}", name));
        let description = prompter.input("Description", Some(&default_description))?;
        let author = prompter.input("Author", Some(draft.author.as_deref().unwrap_or("")))?;
        let language = prompter.input(
            "Language",
            Some(&draft.language.clone().unwrap_or_else(default_language)),
        )?;
        let license = prompter.input(
            "License",
            Some(&draft.license.clone().unwrap_or_else(default_license)),
        )?;
        let entrypoint = ask_validated(
            prompter,
            "Entrypoint file",
            Some(&draft.entrypoint.clone().unwrap_or_else(default_entrypoint)),
            "entrypoint",
            |value| validation::validate_entrypoint(&root, value),
        )?;

        let pricing = if prompter.ask_confirm("Add pricing information?", false)? {
            let currency = prompter.input("Currency", Some("USD"))?;
            let amount = ask_validated(prompter, "Amount", Some("0.0"), "amount", |value| {
                validation::validate_amount(value).map(|_| ())
            })?;
            Some(Pricing {
                currency,
                amount: validation::validate_amount(&amount)
                    .map_err(|reason| errors::validation_error(reason, Some("amount")))?,
            })
        } else {
            None
        };

        Ok(ServerDescriptor {
            name,
            version,
            description,
            author,
            language,
            license,
            entrypoint,
            repository: RepositoryRef::git(repository_url),
            pricing,
        })
    }

    fn collect_from_draft(&self, draft: &DescriptorDraft) -> McpHubResult<ServerDescriptor> {
        let name = require(&draft.name, "name")?;
        let version = require(&draft.version, "version")?;
        let entrypoint = require(&draft.entrypoint, "entrypoint")?;
        let repository_url = draft.repository_url.clone().unwrap_or_default();

        check(validation::validate_name(&name), "name")?;
        check(validation::validate_version(&version), "version")?;
        check(
            validation::validate_entrypoint(&self.paths.root, &entrypoint),
            "entrypoint",
        )?;
        check(validation::validate_repository_url(&repository_url), "repository")?;

        Ok(ServerDescriptor {
            description: draft
                .description
                .clone()
                .unwrap_or_else(|| format!("MCP server for {}", name)),
            author: draft.author.clone().unwrap_or_default(),
            language: draft.language.clone().unwrap_or_else(default_language),
            license: draft.license.clone().unwrap_or_else(default_license),
            repository: RepositoryRef::git(repository_url),
            pricing: None,
            name,
            version,
            entrypoint,
        })
    }
}

fn ask_validated<F>(
    prompter: &mut dyn Prompter,
    prompt: &str,
    default: Option<&str>,
    field: &str,
    rule: F,
) -> McpHubResult<String>
where
    F: Fn(&str) -> Check,
{
    let mut rejected = 0;
    loop {
        let value = prompter.input(prompt, default)?;
        match rule(&value) {
            Ok(()) => return Ok(value),
            Err(reason) => {
                rejected += 1;
                if rejected >= MAX_ATTEMPTS {
                    return Err(errors::validation_error(reason, Some(field)));
                }
                prompter.reject(&reason);
            }
        }
    }
}

fn require(value: &Option<String>, field: &str) -> McpHubResult<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            errors::validation_error(
                format!("--{} is required when prompting is disabled", field),
                Some(field),
            )
        })
}

fn check(result: Check, field: &str) -> McpHubResult<()> {
    result.map_err(|reason| errors::validation_error(reason, Some(field)))
}
