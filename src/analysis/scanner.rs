//! Scanner subprocess
//!
//! The analysis itself runs in `sonar-scanner` against a shallow clone of
//! the repository; SonarCloud then processes the upload asynchronously.

use super::sonar::SonarCredentials;
use crate::config::{SCANNER_TIMEOUT, SONAR_TOKEN_ENV};
use crate::error::{errors, AnalysisStage, McpHubResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Uploads a repository's sources to the analysis service.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(
        &self,
        repository_url: &str,
        project_key: &str,
        credentials: &SonarCredentials,
    ) -> McpHubResult<()>;
}

/// `git clone --depth 1` + `sonar-scanner` in a temporary directory.
#[derive(Debug, Clone)]
pub struct SonarScanner {
    pub git_program: String,
    pub scanner_program: String,
    pub timeout: Duration,
}

impl Default for SonarScanner {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            scanner_program: "sonar-scanner".to_string(),
            timeout: SCANNER_TIMEOUT,
        }
    }
}

impl SonarScanner {
    async fn clone_repository(&self, repository_url: &str, target: &Path) -> McpHubResult<()> {
        info!("Cloning {}", repository_url);
        let output = Command::new(&self.git_program)
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(repository_url)
            .arg(target)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| {
                errors::analysis_error_with_source(
                    AnalysisStage::Clone,
                    format!("could not run {}", self.git_program),
                    err,
                )
            })?;

        if !output.status.success() {
            return Err(errors::analysis_error(
                AnalysisStage::Clone,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    /// The token travels in the environment so it stays out of the process list.
    fn scanner_command(
        &self,
        checkout: &Path,
        project_key: &str,
        credentials: &SonarCredentials,
    ) -> Command {
        let mut command = Command::new(&self.scanner_program);
        command
            .args(scanner_args(project_key, credentials))
            .env(SONAR_TOKEN_ENV, &credentials.token)
            .current_dir(checkout)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn run_scanner(
        &self,
        checkout: &Path,
        project_key: &str,
        credentials: &SonarCredentials,
    ) -> McpHubResult<()> {
        info!("Running {} for {}", self.scanner_program, project_key);
        let mut command = self.scanner_command(checkout, project_key, credentials);
        let child = command.spawn().map_err(|err| {
            errors::analysis_error_with_source(
                AnalysisStage::Scanner,
                format!("could not start {}", self.scanner_program),
                err,
            )
        })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                errors::analysis_error(
                    AnalysisStage::Scanner,
                    format!("timed out after {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(|err| {
                errors::analysis_error_with_source(AnalysisStage::Scanner, "scanner I/O failed", err)
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("Scanner output:\n{}", stdout);
            return Err(errors::analysis_error(
                AnalysisStage::Scanner,
                format!("exited with {}: {}", output.status, last_lines(&stderr, &stdout)),
            ));
        }

        for line in stdout.lines().filter(|l| l.contains("ceTaskId") || l.contains("task?")) {
            debug!("{}", line.trim());
        }
        Ok(())
    }
}

#[async_trait]
impl Scanner for SonarScanner {
    async fn scan(
        &self,
        repository_url: &str,
        project_key: &str,
        credentials: &SonarCredentials,
    ) -> McpHubResult<()> {
        let workspace = tempfile::Builder::new()
            .prefix("mcphub-scan-")
            .tempdir()
            .map_err(|err| errors::analysis_error_with_source(AnalysisStage::Clone, "no temp dir", err))?;
        let checkout = workspace.path().join("repo");

        self.clone_repository(repository_url, &checkout).await?;
        self.run_scanner(&checkout, project_key, credentials).await
    }
}

/// `-D` properties passed to `sonar-scanner`.
pub fn scanner_args(project_key: &str, credentials: &SonarCredentials) -> Vec<String> {
    vec![
        format!("-Dsonar.projectKey={}", project_key),
        format!("-Dsonar.organization={}", credentials.organization),
        "-Dsonar.sources=.".to_string(),
        "-Dsonar.sourceEncoding=UTF-8".to_string(),
        format!("-Dsonar.host.url={}", credentials.host),
    ]
}

fn last_lines(stderr: &str, stdout: &str) -> String {
    let source = if stderr.trim().is_empty() { stdout } else { stderr };
    let lines: Vec<&str> = source.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(5)..].join("\n")
}

/// Skips the upload; used where the service is mocked.
#[cfg(test)]
pub struct NoopScanner;

#[cfg(test)]
#[async_trait]
impl Scanner for NoopScanner {
    async fn scan(&self, _: &str, _: &str, _: &SonarCredentials) -> McpHubResult<()> {
        Ok(())
    }
}
