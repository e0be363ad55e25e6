//! 推送工作流集成测试
//!
//! Runs `push_server` against an in-memory registry and a scripted analysis
//! backend, so no network or scanner is involved.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mcphub::analysis::report::{self, ReportWriter};
use mcphub::analysis::scanner::SonarScanner;
use mcphub::analysis::sonar::{SonarCloudService, SonarCredentials, SonarIssue};
use mcphub::analysis::{
    AnalysisRunner, AnalysisService, GitHubRepo, ManualClock, ReportDocument, Submission,
    TaskStatus,
};
use mcphub::commands::push::push_server;
use mcphub::descriptor::{RepositoryRef, ServerDescriptor};
use mcphub::error::{McpHubError, McpHubResult};
use mcphub::registry::{InMemoryStore, RegistryClient, RegistryRecord};
use mcphub::utils::ProjectPaths;
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

struct FixedService {
    statuses: Mutex<VecDeque<TaskStatus>>,
}

impl FixedService {
    fn new(statuses: Vec<TaskStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
        }
    }
}

#[async_trait]
impl AnalysisService for FixedService {
    async fn submit(&self, repository: &GitHubRepo, _: &str) -> McpHubResult<Submission> {
        Ok(Submission {
            project_key: repository.project_key("acme-org"),
            repository: repository.clone(),
        })
    }

    async fn poll_status(&self, _: &Submission) -> McpHubResult<TaskStatus> {
        let next = self.statuses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| TaskStatus::Pending("IN_PROGRESS".to_string())))
    }

    async fn fetch_report(&self, submission: &Submission) -> McpHubResult<ReportDocument> {
        let issues = vec![
            SonarIssue {
                severity: Some("MAJOR".to_string()),
                kind: Some("BUG".to_string()),
                rule: Some("python:S1481".to_string()),
                message: Some("Remove the unused local variable".to_string()),
                component: "acme-org_weather:server.py".to_string(),
                line: Some(12),
                status: Some("OPEN".to_string()),
            },
            SonarIssue {
                severity: Some("CRITICAL".to_string()),
                kind: Some("VULNERABILITY".to_string()),
                rule: Some("python:S2068".to_string()),
                message: Some("Hard-coded credential".to_string()),
                component: "acme-org_weather:config.py".to_string(),
                line: Some(3),
                status: Some("OPEN".to_string()),
            },
        ];
        let metrics = BTreeMap::from([("ncloc".to_string(), "420".to_string())]);
        Ok(report::build(
            &submission.repository,
            &submission.project_key,
            &format!("https://sonarcloud.io/dashboard?id={}", submission.project_key),
            &issues,
            &[],
            metrics,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap(),
        ))
    }
}

fn descriptor() -> ServerDescriptor {
    ServerDescriptor {
        name: "WeatherMCP".to_string(),
        version: "1.0.0".to_string(),
        description: "Weather forecasts over MCP".to_string(),
        author: "Ada".to_string(),
        language: "Python".to_string(),
        license: "MIT".to_string(),
        entrypoint: "server.py".to_string(),
        repository: RepositoryRef::git("https://github.com/acme-org/weather"),
        pricing: None,
    }
}

fn runner(temp: &TempDir, service: impl AnalysisService + 'static) -> AnalysisRunner {
    AnalysisRunner::with_clock(
        Box::new(service),
        Box::new(ManualClock::default()),
        ReportWriter::new(ProjectPaths::new(temp.path())),
    )
}

fn stored(store: &InMemoryStore) -> Option<RegistryRecord> {
    store
        .object("servers/WeatherMCP.json")
        .map(|body| serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn push_publishes_record_with_analysis_summary() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let registry = RegistryClient::new(store.clone());
    let runner = runner(
        &temp,
        FixedService::new(vec![
            TaskStatus::Pending("IN_PROGRESS".to_string()),
            TaskStatus::Succeeded,
        ]),
    );

    let ack = push_server(
        &descriptor(),
        false,
        &registry,
        &runner,
        &|_: &str| -> bool { panic!("no prompt for a new server") },
        Some("https://lambda.example.com"),
    )
    .await
    .unwrap();

    assert!(!ack.replaced);
    assert_eq!(ack.key, "servers/WeatherMCP.json");
    assert_eq!(store.writes(), 1);

    let record = stored(&store).unwrap();
    assert_eq!(record.name, "WeatherMCP");
    assert_eq!(record.repository_url(), "https://github.com/acme-org/weather");
    let analysis = record.analysis.unwrap();
    assert_eq!(analysis.counts.total_issues, 2);
    assert_eq!(analysis.counts.bugs, 1);
    assert_eq!(analysis.counts.vulnerabilities, 1);
    assert_eq!(
        record.invocation.unwrap().url,
        "https://lambda.example.com/WeatherMCP"
    );

    assert!(temp.path().join("reports/analysis-report.json").exists());
}

#[tokio::test]
async fn republish_keeps_created_at() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let registry = RegistryClient::new(store.clone());

    let first = runner(&temp, FixedService::new(vec![TaskStatus::Succeeded]));
    push_server(&descriptor(), false, &registry, &first, &|_: &str| true, None)
        .await
        .unwrap();
    let created_at = stored(&store).unwrap().meta.created_at;

    let mut updated = descriptor();
    updated.version = "1.1.0".to_string();
    let second = runner(&temp, FixedService::new(vec![TaskStatus::Succeeded]));
    let ack = push_server(&updated, false, &registry, &second, &|_: &str| true, None)
        .await
        .unwrap();

    assert!(ack.replaced);
    let record = stored(&store).unwrap();
    assert_eq!(record.version, "1.1.0");
    assert_eq!(record.meta.created_at, created_at);
    assert!(record.meta.updated_at >= created_at);
}

#[tokio::test]
async fn declined_overwrite_leaves_record_untouched() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let registry = RegistryClient::new(store.clone());
    let first = runner(&temp, FixedService::new(vec![TaskStatus::Succeeded]));
    push_server(&descriptor(), false, &registry, &first, &|_: &str| true, None)
        .await
        .unwrap();
    let before = store.object("servers/WeatherMCP.json").unwrap();

    let mut updated = descriptor();
    updated.version = "2.0.0".to_string();
    let second = runner(&temp, FixedService::new(vec![TaskStatus::Succeeded]));
    let err = push_server(&updated, false, &registry, &second, &|_: &str| false, None)
        .await
        .unwrap_err();

    assert!(matches!(err, McpHubError::Aborted { .. }));
    assert_eq!(err.exit_code(), 0);
    assert_eq!(store.writes(), 1);
    assert_eq!(store.object("servers/WeatherMCP.json").unwrap(), before);
    // Analysis never started.
    assert!(second.history().is_empty());
}

#[tokio::test]
async fn timed_out_analysis_uploads_nothing() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let registry = RegistryClient::new(store.clone());
    let runner = runner(&temp, FixedService::new(Vec::new()))
        .with_timing(Duration::from_secs(3), Duration::from_secs(60));

    let err = push_server(&descriptor(), false, &registry, &runner, &|_: &str| true, None)
        .await
        .unwrap_err();

    assert!(matches!(err, McpHubError::AnalysisTimeout { .. }));
    assert_eq!(store.writes(), 0);
    assert!(stored(&store).is_none());
}

#[tokio::test]
async fn unreachable_analysis_service_fails_before_upload() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let registry = RegistryClient::new(store.clone());
    let service = SonarCloudService::new(
        SonarCredentials {
            host: "http://127.0.0.1:9".to_string(),
            token: "token".to_string(),
            organization: "acme-org".to_string(),
        },
        Box::new(SonarScanner::default()),
    )
    .unwrap();
    let runner = runner(&temp, service);

    let err = push_server(&descriptor(), false, &registry, &runner, &|_: &str| true, None)
        .await
        .unwrap_err();

    assert!(matches!(err, McpHubError::AnalysisService { .. }));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn unusable_names_are_refused_before_analysis() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let registry = RegistryClient::new(store.clone());

    for name in ["", "team/weather"] {
        let mut named = descriptor();
        named.name = name.to_string();
        let runner = runner(&temp, FixedService::new(vec![TaskStatus::Succeeded]));

        let err = push_server(&named, true, &registry, &runner, &|_: &str| true, None)
            .await
            .unwrap_err();

        assert!(matches!(err, McpHubError::Validation { .. }), "{name:?}");
        assert!(runner.history().is_empty());
    }
    assert_eq!(store.writes(), 0);
}
