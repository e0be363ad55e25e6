//! Analysis runner
//!
//! One run per push: submit the repository, poll the analysis service until
//! it settles, then fetch and persist the report.
//!
//! ```text
//! PENDING -> SUBMITTED -> POLLING -> COMPLETE
//!                                 -> FAILED
//!                                 -> TIMEOUT
//! ```
//!
//! Time is read through [`Clock`] so the polling loop can be driven without
//! real delays.

pub mod project;
pub mod report;
pub mod scanner;
pub mod sonar;

pub use project::GitHubRepo;
pub use report::{FindingsSummary, ReportDocument, ReportWriter};

use crate::config::{MAX_ANALYSIS_WAIT, POLL_INTERVAL};
use crate::descriptor::ServerDescriptor;
use crate::error::{errors, McpHubError, McpHubResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lifecycle of a single analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Pending,
    Submitted,
    Polling,
    Complete,
    Failed,
    Timeout,
}

impl AnalysisState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AnalysisState::Complete | AnalysisState::Failed | AnalysisState::Timeout
        )
    }
}

/// What one status check reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Queued or running; carries the service's status string.
    Pending(String),
    Succeeded,
    /// Settled without success.
    Failed(String),
    /// The check itself failed; polling continues.
    Unreachable(String),
}

/// Handle for a submitted analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub project_key: String,
    pub repository: GitHubRepo,
}

/// Remote analysis backend.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn submit(&self, repository: &GitHubRepo, repository_url: &str) -> McpHubResult<Submission>;

    /// `Err` only for failures that make further polling pointless.
    async fn poll_status(&self, submission: &Submission) -> McpHubResult<TaskStatus>;

    async fn fetch_report(&self, submission: &Submission) -> McpHubResult<ReportDocument>;
}

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that only advances when slept on.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub server_name: String,
    pub timestamp: DateTime<Utc>,
    pub project_key: String,
    pub dashboard_url: String,
    pub summary: FindingsSummary,
    /// Timestamped file under `reports/`.
    pub report_path: PathBuf,
    pub document: ReportDocument,
}

/// Drives one analysis through the state machine.
pub struct AnalysisRunner {
    service: Box<dyn AnalysisService>,
    clock: Box<dyn Clock>,
    writer: ReportWriter,
    poll_interval: Duration,
    max_wait: Duration,
    history: Mutex<Vec<AnalysisState>>,
}

impl AnalysisRunner {
    pub fn new(service: Box<dyn AnalysisService>, writer: ReportWriter) -> Self {
        Self::with_clock(service, Box::new(SystemClock), writer)
    }

    pub fn with_clock(
        service: Box<dyn AnalysisService>,
        clock: Box<dyn Clock>,
        writer: ReportWriter,
    ) -> Self {
        Self {
            service,
            clock,
            writer,
            poll_interval: POLL_INTERVAL,
            max_wait: MAX_ANALYSIS_WAIT,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn with_timing(mut self, poll_interval: Duration, max_wait: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.max_wait = max_wait;
        self
    }

    /// States visited by the last run, in order.
    pub fn history(&self) -> Vec<AnalysisState> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn state(&self) -> Option<AnalysisState> {
        self.history().last().copied()
    }

    fn transition(&self, state: AnalysisState) {
        debug!("Analysis state -> {:?}", state);
        if let Ok(mut history) = self.history.lock() {
            history.push(state);
        }
    }

    fn fail(&self, err: McpHubError) -> McpHubError {
        let state = match err {
            McpHubError::AnalysisTimeout { .. } => AnalysisState::Timeout,
            _ => AnalysisState::Failed,
        };
        self.transition(state);
        err
    }

    pub async fn run(&self, descriptor: &ServerDescriptor) -> McpHubResult<AnalysisReport> {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
        self.transition(AnalysisState::Pending);

        let repository_url = descriptor.repository_url().trim();
        if repository_url.is_empty() {
            return Err(self.fail(errors::validation_error(
                "mcphub.json has no repository URL; run 'mcphub init' again",
                Some("repository"),
            )));
        }
        let repository = GitHubRepo::parse(repository_url).ok_or_else(|| {
            self.fail(errors::validation_error(
                format!("could not parse owner/repo from '{}'", repository_url),
                Some("repository"),
            ))
        })?;

        info!("Submitting {} for analysis", repository);
        let submission = self
            .service
            .submit(&repository, repository_url)
            .await
            .map_err(|err| self.fail(err))?;
        self.transition(AnalysisState::Submitted);

        self.wait_for_completion(&submission)
            .await
            .map_err(|err| self.fail(err))?;

        let document = self
            .service
            .fetch_report(&submission)
            .await
            .map_err(|err| self.fail(err))?;
        let report_path = self.writer.save(&document).map_err(|err| self.fail(err))?;
        self.transition(AnalysisState::Complete);

        Ok(AnalysisReport {
            server_name: descriptor.name.clone(),
            timestamp: document.metadata.analysis_date,
            project_key: submission.project_key,
            dashboard_url: document.metadata.sonarcloud_url.clone(),
            summary: document.summary.clone(),
            report_path,
            document,
        })
    }

    async fn wait_for_completion(&self, submission: &Submission) -> McpHubResult<()> {
        self.transition(AnalysisState::Polling);
        let started = self.clock.now();

        loop {
            match self.service.poll_status(submission).await? {
                TaskStatus::Succeeded => {
                    info!("Analysis processing complete");
                    return Ok(());
                }
                TaskStatus::Failed(status) => {
                    return Err(errors::analysis_error(
                        crate::error::AnalysisStage::Polling,
                        format!("analysis task ended with status {}", status),
                    ));
                }
                TaskStatus::Pending(status) => debug!("Analysis status: {}", status),
                TaskStatus::Unreachable(reason) => warn!("Error checking status: {}", reason),
            }

            let waited = self.clock.now().duration_since(started);
            if waited >= self.max_wait {
                return Err(McpHubError::AnalysisTimeout {
                    project_key: submission.project_key.clone(),
                    waited_secs: waited.as_secs(),
                });
            }
            self.clock.sleep(self.poll_interval).await;
        }
    }
}
