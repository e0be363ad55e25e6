//! Unified error handling for mcphub
//!
//! Every failure a command can hit is one of these kinds. Each kind knows
//! its category, the exit code it maps to, and a hint for the user.

use std::fmt;
use std::io;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum McpHubError {
    /// Bad or missing user input
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Missing environment / credentials
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        variable: Option<String>,
    },

    /// Non-retryable failure of the analysis service
    #[error("Analysis service error ({stage}): {message}")]
    AnalysisService {
        message: String,
        stage: AnalysisStage,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Polling exceeded the wait budget
    #[error("Analysis timed out after {waited_secs}s (project: {project_key})")]
    AnalysisTimeout {
        project_key: String,
        waited_secs: u64,
    },

    /// Object store write failure
    #[error("Registry write failed for '{key}': {message}")]
    StoreWrite {
        key: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Object store read failure
    #[error("Registry read failed for '{key}': {message}")]
    StoreRead {
        key: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing record, no discovery fallback
    #[error("Server '{name}' not found")]
    NotFound { name: String },

    /// Missing record, with the names that do exist
    #[error("Server '{name}' not found ({} available)", .suggestions.len())]
    NotFoundWithSuggestions {
        name: String,
        suggestions: Vec<String>,
    },

    /// User declined an overwrite
    #[error("Aborted: {reason}")]
    Aborted { reason: String },

    /// Filesystem errors
    #[error("Filesystem error: {message} (path: {path})")]
    Filesystem {
        message: String,
        path: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Platform without a known editor config location
    #[error("Unsupported operating system: {os}")]
    Unsupported { os: String },
}

/// Where in the analysis pipeline a service failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Credentials,
    ProjectSetup,
    Clone,
    Scanner,
    Polling,
    Report,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AnalysisStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStage::Credentials => "credentials",
            AnalysisStage::ProjectSetup => "project_setup",
            AnalysisStage::Clone => "clone",
            AnalysisStage::Scanner => "scanner",
            AnalysisStage::Polling => "polling",
            AnalysisStage::Report => "report",
        }
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Config,
    Analysis,
    Registry,
    Filesystem,
    Platform,
    Cancelled,
}

impl ErrorCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "Validation",
            ErrorCategory::Config => "Configuration",
            ErrorCategory::Analysis => "Analysis",
            ErrorCategory::Registry => "Registry",
            ErrorCategory::Filesystem => "Filesystem",
            ErrorCategory::Platform => "Platform",
            ErrorCategory::Cancelled => "Cancelled",
        }
    }
}

/// Result type alias for convenience
pub type McpHubResult<T> = Result<T, McpHubError>;

/// User-facing error payload printed by the CLI.
#[derive(Debug, Clone)]
pub struct UserFacingError {
    pub title: String,
    pub message: String,
    pub hint: Option<String>,
}

impl McpHubError {
    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            McpHubError::Validation { .. } => ErrorCategory::Validation,
            McpHubError::Config { .. } => ErrorCategory::Config,
            McpHubError::AnalysisService { .. } | McpHubError::AnalysisTimeout { .. } => {
                ErrorCategory::Analysis
            }
            McpHubError::StoreWrite { .. }
            | McpHubError::StoreRead { .. }
            | McpHubError::NotFound { .. }
            | McpHubError::NotFoundWithSuggestions { .. } => ErrorCategory::Registry,
            McpHubError::Aborted { .. } => ErrorCategory::Cancelled,
            McpHubError::Filesystem { .. } => ErrorCategory::Filesystem,
            McpHubError::Unsupported { .. } => ErrorCategory::Platform,
        }
    }

    /// Process exit code for this error. Declining an overwrite is not a failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            McpHubError::Aborted { .. } => 0,
            _ => 1,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            McpHubError::Validation { message, field } => match field {
                Some(field) => format!("Invalid {}: {}", field, message),
                None => format!("Input validation failed: {}", message),
            },
            McpHubError::Config { message, .. } => format!("Configuration problem: {}", message),
            McpHubError::AnalysisService { message, stage, .. } => match stage {
                AnalysisStage::Credentials => {
                    format!("SonarCloud credentials rejected or unusable: {}", message)
                }
                AnalysisStage::ProjectSetup => {
                    format!("Could not reach SonarCloud to set up the project: {}", message)
                }
                AnalysisStage::Clone => format!("Failed to clone repository: {}", message),
                AnalysisStage::Scanner => format!("sonar-scanner failed: {}", message),
                AnalysisStage::Polling => format!("Analysis failed on SonarCloud: {}", message),
                AnalysisStage::Report => format!("Could not build analysis report: {}", message),
            },
            McpHubError::AnalysisTimeout {
                project_key,
                waited_secs,
            } => format!(
                "SonarCloud did not finish analysing '{}' within {}s",
                project_key, waited_secs
            ),
            McpHubError::StoreWrite { key, message, .. } => {
                format!("Upload of '{}' failed: {}", key, message)
            }
            McpHubError::StoreRead { key, message, .. } => {
                format!("Download of '{}' failed: {}", key, message)
            }
            McpHubError::NotFound { name } => format!("Server '{}' not found in registry", name),
            McpHubError::NotFoundWithSuggestions { name, suggestions } => {
                if suggestions.is_empty() {
                    format!("Server '{}' not found; the registry is empty", name)
                } else {
                    let list: Vec<String> =
                        suggestions.iter().map(|s| format!("  • {}", s)).collect();
                    format!(
                        "Server '{}' not found. Available servers:\n{}",
                        name,
                        list.join("\n")
                    )
                }
            }
            McpHubError::Aborted { reason } => format!("Aborted: {}", reason),
            McpHubError::Filesystem { message, .. } => format!("File system problem: {}", message),
            McpHubError::Unsupported { os } => {
                format!("Unsupported operating system: {}", os)
            }
        }
    }

    /// Convert into a user-facing payload with actionable hints.
    pub fn to_user_facing(&self) -> UserFacingError {
        let hint = match self {
            McpHubError::Validation { .. } => {
                Some("Correct the provided value and run the command again.".to_string())
            }
            McpHubError::Config { variable, .. } => Some(match variable {
                Some(var) => format!("Add {}=... to .env or export it in your shell.", var),
                None => "Check the .env file in the current directory.".to_string(),
            }),
            McpHubError::AnalysisService { stage, .. } => match stage {
                AnalysisStage::Scanner => Some(
                    "Make sure sonar-scanner is installed and on PATH.".to_string(),
                ),
                AnalysisStage::Clone => {
                    Some("Check the repository URL in mcphub.json and that git is installed.".to_string())
                }
                _ => Some(
                    "Check SONAR_TOKEN / SONAR_ORGANIZATION and your network connection."
                        .to_string(),
                ),
            },
            McpHubError::AnalysisTimeout { .. } => Some(
                "SonarCloud may still be processing; the local report directory keeps the last artifact."
                    .to_string(),
            ),
            McpHubError::StoreWrite { .. } | McpHubError::StoreRead { .. } => Some(
                "Check AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY / AWS_REGION and the bucket name."
                    .to_string(),
            ),
            McpHubError::NotFound { .. } => {
                Some("Use 'mcphub search --name <name>' to list registered servers.".to_string())
            }
            McpHubError::NotFoundWithSuggestions { .. } => None,
            McpHubError::Aborted { .. } => None,
            McpHubError::Filesystem { .. } => Some(
                "Ensure the path exists and mcphub has permission to read/write it.".to_string(),
            ),
            McpHubError::Unsupported { .. } => {
                Some("Supported platforms are macOS, Windows and Linux.".to_string())
            }
        };

        UserFacingError {
            title: format!("{} Error", self.category().display_name()),
            message: self.user_message(),
            hint,
        }
    }
}

impl From<io::Error> for McpHubError {
    fn from(err: io::Error) -> Self {
        McpHubError::Filesystem {
            message: format!("I/O error: {err}"),
            path: "<io>".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<dialoguer::Error> for McpHubError {
    fn from(err: dialoguer::Error) -> Self {
        McpHubError::Validation {
            message: format!("prompt failed: {err}"),
            field: None,
        }
    }
}

/// Convenience functions for creating common errors
pub mod errors {
    use super::*;

    pub fn validation_error(message: impl Into<String>, field: Option<&str>) -> McpHubError {
        McpHubError::Validation {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    pub fn missing_env(variable: &str) -> McpHubError {
        McpHubError::Config {
            message: format!("{} not found in .env file or environment", variable),
            variable: Some(variable.to_string()),
        }
    }

    pub fn analysis_error(stage: AnalysisStage, message: impl Into<String>) -> McpHubError {
        McpHubError::AnalysisService {
            message: message.into(),
            stage,
            source: None,
        }
    }

    pub fn analysis_error_with_source(
        stage: AnalysisStage,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> McpHubError {
        McpHubError::AnalysisService {
            message: message.into(),
            stage,
            source: Some(Box::new(source)),
        }
    }

    pub fn store_read_error(key: impl Into<String>, message: impl Into<String>) -> McpHubError {
        McpHubError::StoreRead {
            key: key.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn store_write_error(key: impl Into<String>, message: impl Into<String>) -> McpHubError {
        McpHubError::StoreWrite {
            key: key.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn filesystem_error(
        message: impl Into<String>,
        path: impl AsRef<std::path::Path>,
        source: io::Error,
    ) -> McpHubError {
        McpHubError::Filesystem {
            message: message.into(),
            path: path.as_ref().display().to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn aborted(reason: impl Into<String>) -> McpHubError {
        McpHubError::Aborted {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = errors::validation_error("must not be empty", Some("name"));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.user_message().contains("name"));

        let err = errors::analysis_error(AnalysisStage::Polling, "FAILED");
        assert_eq!(err.category(), ErrorCategory::Analysis);

        let err = McpHubError::NotFound {
            name: "WeatherMCP".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Registry);
    }

    #[test]
    fn aborted_is_not_a_failure() {
        assert_eq!(errors::aborted("user declined").exit_code(), 0);
        assert_eq!(errors::missing_env("SONAR_TOKEN").exit_code(), 1);
        let timeout = McpHubError::AnalysisTimeout {
            project_key: "org_a_b".to_string(),
            waited_secs: 60,
        };
        assert_eq!(timeout.exit_code(), 1);
    }

    #[test]
    fn suggestions_message_distinguishes_empty_store() {
        let empty = McpHubError::NotFoundWithSuggestions {
            name: "x".to_string(),
            suggestions: vec![],
        };
        assert!(empty.user_message().contains("registry is empty"));

        let some = McpHubError::NotFoundWithSuggestions {
            name: "x".to_string(),
            suggestions: vec!["WeatherMCP".to_string(), "NewsMCP".to_string()],
        };
        assert!(some.user_message().contains("  • WeatherMCP\n  • NewsMCP"));
    }

    #[test]
    fn credential_failures_do_not_claim_missing_token() {
        let err = errors::analysis_error(AnalysisStage::Credentials, "HTTP 401 Unauthorized");
        let message = err.user_message();
        assert!(message.contains("rejected or unusable"));
        assert!(!message.contains("missing"));
    }

    #[test]
    fn config_hint_names_the_variable() {
        let payload = errors::missing_env("LAMBDA_BASE_URL").to_user_facing();
        assert!(payload.title.contains("Configuration"));
        assert!(payload.hint.unwrap().contains("LAMBDA_BASE_URL"));
    }
}
