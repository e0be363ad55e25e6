// SonarCloud Service - HTTP Web API client
// Creates projects, checks the compute-engine queue and pulls findings.

use super::project::GitHubRepo;
use super::report::{self, ReportDocument};
use super::scanner::Scanner;
use super::{AnalysisService, Submission, TaskStatus};
use crate::config::{HTTP_TIMEOUT, SONAR_PAGE_SIZE};
use crate::error::{errors, AnalysisStage, McpHubResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Metrics requested from `/api/measures/component`.
pub const METRIC_KEYS: [&str; 11] = [
    "ncloc",
    "coverage",
    "bugs",
    "vulnerabilities",
    "code_smells",
    "security_hotspots",
    "sqale_rating",
    "reliability_rating",
    "security_rating",
    "duplicated_lines_density",
    "complexity",
];

/// Token + organization used for every SonarCloud call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SonarCredentials {
    pub host: String,
    pub token: String,
    pub organization: String,
}

impl SonarCredentials {
    pub fn dashboard_url(&self, project_key: &str) -> String {
        format!("{}/dashboard?id={}", self.host.trim_end_matches('/'), project_key)
    }
}

/// Issue as returned by `/api/issues/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SonarIssue {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Hotspot as returned by `/api/hotspots/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SonarHotspot {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "securityCategory", default)]
    pub security_category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssuesPage {
    #[serde(default)]
    issues: Vec<SonarIssue>,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct HotspotsPage {
    #[serde(default)]
    hotspots: Vec<SonarHotspot>,
    #[serde(default)]
    paging: Paging,
}

#[derive(Debug, Default, Deserialize)]
struct Paging {
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct MeasuresResponse {
    #[serde(default)]
    component: MeasuresComponent,
}

#[derive(Debug, Default, Deserialize)]
struct MeasuresComponent {
    #[serde(default)]
    measures: Vec<Measure>,
}

#[derive(Debug, Deserialize)]
struct Measure {
    metric: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComponentTasks {
    #[serde(default)]
    queue: Vec<serde_json::Value>,
    #[serde(default)]
    current: Option<CurrentTask>,
}

#[derive(Debug, Deserialize)]
struct CurrentTask {
    #[serde(default)]
    status: String,
}

/// SonarCloud-backed [`AnalysisService`].
pub struct SonarCloudService {
    credentials: SonarCredentials,
    http_client: reqwest::Client,
    scanner: Box<dyn Scanner>,
}

impl SonarCloudService {
    pub fn new(credentials: SonarCredentials, scanner: Box<dyn Scanner>) -> McpHubResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| {
                errors::analysis_error_with_source(
                    AnalysisStage::Credentials,
                    "Failed to build HTTP client",
                    err,
                )
            })?;
        Ok(Self {
            credentials,
            http_client,
            scanner,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.credentials.host.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(self.url(path))
            .bearer_auth(&self.credentials.token)
    }

    /// Create the project; an existing project is reused.
    pub async fn create_project(&self, project_key: &str, display_name: &str) -> McpHubResult<()> {
        info!("Creating SonarCloud project: {}", project_key);

        let response = self
            .http_client
            .post(self.url("/api/projects/create"))
            .bearer_auth(&self.credentials.token)
            .query(&[
                ("organization", self.credentials.organization.as_str()),
                ("project", project_key),
                ("name", display_name),
            ])
            .send()
            .await
            .map_err(|err| {
                errors::analysis_error_with_source(
                    AnalysisStage::ProjectSetup,
                    format!("{} is unreachable", self.credentials.host),
                    err,
                )
            })?;

        let status = response.status();
        if status.is_success() {
            info!("Project created: {}", project_key);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && body.to_lowercase().contains("already") {
            info!("Project already exists, reusing: {}", project_key);
            return Ok(());
        }
        if is_auth_failure(status) {
            return Err(errors::analysis_error(
                AnalysisStage::Credentials,
                format!("SonarCloud rejected the token ({})", status),
            ));
        }

        // The scanner can still create the project on first analysis.
        warn!("Could not create project {} ({}): {}", project_key, status, body);
        Ok(())
    }

    /// All issues for the project, following pagination.
    pub async fn fetch_issues(&self, project_key: &str) -> McpHubResult<Vec<SonarIssue>> {
        debug!("Fetching issues for {}", project_key);
        let mut all_issues = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .get("/api/issues/search")
                .query(&[
                    ("componentKeys", project_key.to_string()),
                    ("ps", SONAR_PAGE_SIZE.to_string()),
                    ("p", page.to_string()),
                ])
                .send()
                .await
                .map_err(|err| report_error("Failed to fetch issues", err))?;

            if !response.status().is_success() {
                warn!("Failed to fetch issues: {}", response.status());
                break;
            }

            let data: IssuesPage = response
                .json()
                .await
                .map_err(|err| report_error("Failed to parse issues response", err))?;
            let received = data.issues.len();
            all_issues.extend(data.issues);

            if all_issues.len() >= data.total || received < SONAR_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        info!("Found {} issues", all_issues.len());
        Ok(all_issues)
    }

    /// All security hotspots for the project, following pagination.
    pub async fn fetch_hotspots(&self, project_key: &str) -> McpHubResult<Vec<SonarHotspot>> {
        debug!("Fetching security hotspots for {}", project_key);
        let mut all_hotspots = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .get("/api/hotspots/search")
                .query(&[
                    ("projectKey", project_key.to_string()),
                    ("ps", SONAR_PAGE_SIZE.to_string()),
                    ("p", page.to_string()),
                ])
                .send()
                .await
                .map_err(|err| report_error("Failed to fetch hotspots", err))?;

            if !response.status().is_success() {
                warn!("Failed to fetch hotspots: {}", response.status());
                break;
            }

            let data: HotspotsPage = response
                .json()
                .await
                .map_err(|err| report_error("Failed to parse hotspots response", err))?;
            let received = data.hotspots.len();
            all_hotspots.extend(data.hotspots);

            if all_hotspots.len() >= data.paging.total || received < SONAR_PAGE_SIZE {
                break;
            }
            page += 1;
        }

        info!("Found {} security hotspots", all_hotspots.len());
        Ok(all_hotspots)
    }

    /// Code metrics keyed by metric name. Missing measures are omitted.
    pub async fn fetch_measures(&self, project_key: &str) -> McpHubResult<BTreeMap<String, String>> {
        let metric_keys = METRIC_KEYS.join(",");
        let response = self
            .get("/api/measures/component")
            .query(&[("component", project_key), ("metricKeys", metric_keys.as_str())])
            .send()
            .await
            .map_err(|err| report_error("Failed to fetch metrics", err))?;

        if !response.status().is_success() {
            warn!("Failed to fetch metrics: {}", response.status());
            return Ok(BTreeMap::new());
        }

        let data: MeasuresResponse = response
            .json()
            .await
            .map_err(|err| report_error("Failed to parse metrics response", err))?;

        let metrics: BTreeMap<String, String> = data
            .component
            .measures
            .into_iter()
            .filter_map(|measure| measure.value.map(|value| (measure.metric, value)))
            .collect();
        info!("Retrieved {} metrics", metrics.len());
        Ok(metrics)
    }
}

#[async_trait]
impl AnalysisService for SonarCloudService {
    async fn submit(&self, repository: &GitHubRepo, repository_url: &str) -> McpHubResult<Submission> {
        let project_key = repository.project_key(&self.credentials.organization);
        self.create_project(&project_key, &repository.to_string())
            .await?;
        self.scanner
            .scan(repository_url, &project_key, &self.credentials)
            .await?;
        Ok(Submission {
            project_key,
            repository: repository.clone(),
        })
    }

    async fn poll_status(&self, submission: &Submission) -> McpHubResult<TaskStatus> {
        let response = match self
            .get("/api/ce/component")
            .query(&[("component", submission.project_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return Ok(TaskStatus::Unreachable(err.to_string())),
        };

        let status = response.status();
        if is_auth_failure(status) {
            return Err(errors::analysis_error(
                AnalysisStage::Polling,
                format!("SonarCloud rejected the token ({})", status),
            ));
        }
        if !status.is_success() {
            return Ok(TaskStatus::Unreachable(format!("HTTP {}", status)));
        }

        let tasks: ComponentTasks = match response.json().await {
            Ok(tasks) => tasks,
            Err(err) => return Ok(TaskStatus::Unreachable(err.to_string())),
        };
        Ok(classify(tasks))
    }

    async fn fetch_report(&self, submission: &Submission) -> McpHubResult<ReportDocument> {
        let key = &submission.project_key;
        let issues = self.fetch_issues(key).await?;
        let hotspots = self.fetch_hotspots(key).await?;
        let metrics = self.fetch_measures(key).await?;

        Ok(report::build(
            &submission.repository,
            key,
            &self.credentials.dashboard_url(key),
            &issues,
            &hotspots,
            metrics,
            Utc::now(),
        ))
    }
}

fn classify(tasks: ComponentTasks) -> TaskStatus {
    if !tasks.queue.is_empty() {
        return TaskStatus::Pending("QUEUED".to_string());
    }
    match tasks.current {
        None => TaskStatus::Succeeded,
        Some(task) => match task.status.as_str() {
            "SUCCESS" => TaskStatus::Succeeded,
            "PENDING" | "IN_PROGRESS" => TaskStatus::Pending(task.status),
            _ => TaskStatus::Failed(task.status),
        },
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn report_error(message: &str, err: reqwest::Error) -> crate::error::McpHubError {
    errors::analysis_error_with_source(AnalysisStage::Report, message, err)
}
