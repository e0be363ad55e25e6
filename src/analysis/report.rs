//! Analysis report document, persistence and console summary.

use super::project::GitHubRepo;
use super::sonar::{SonarHotspot, SonarIssue};
use crate::error::{errors, McpHubResult};
use crate::utils::ProjectPaths;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Full report as written to `reports/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub summary: FindingsSummary,
    pub metrics: BTreeMap<String, String>,
    pub issues: IssueBreakdown,
    pub security_hotspots: Vec<HotspotDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// `{owner}_{repo}`
    pub repository: String,
    pub project_key: String,
    pub analysis_date: DateTime<Utc>,
    pub sonarcloud_url: String,
}

/// Counts published with the registry record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub total_issues: usize,
    pub bugs: usize,
    pub vulnerabilities: usize,
    pub code_smells: usize,
    pub security_hotspots: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueBreakdown {
    pub by_severity: SeverityCounts,
    pub details: SeverityDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub blocker: usize,
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
    pub info: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct SeverityDetails {
    pub blocker: Vec<IssueDetail>,
    pub critical: Vec<IssueDetail>,
    pub major: Vec<IssueDetail>,
    pub minor: Vec<IssueDetail>,
    pub info: Vec<IssueDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDetail {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub rule: Option<String>,
    pub message: Option<String>,
    pub file: String,
    pub line: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotDetail {
    pub message: Option<String>,
    pub file: String,
    pub line: Option<u64>,
    pub status: Option<String>,
    pub category: Option<String>,
}

/// Assemble the report from raw SonarCloud findings.
pub fn build(
    repository: &GitHubRepo,
    project_key: &str,
    dashboard_url: &str,
    issues: &[SonarIssue],
    hotspots: &[SonarHotspot],
    metrics: BTreeMap<String, String>,
    analysed_at: DateTime<Utc>,
) -> ReportDocument {
    let count_type = |kind: &str| {
        issues
            .iter()
            .filter(|issue| issue.kind.as_deref() == Some(kind))
            .count()
    };

    let mut details = SeverityDetails::default();
    for issue in issues {
        let detail = IssueDetail {
            kind: issue.kind.clone(),
            rule: issue.rule.clone(),
            message: issue.message.clone(),
            file: component_file(&issue.component),
            line: issue.line,
            status: issue.status.clone(),
        };
        // Unknown severities are filed under INFO.
        match issue.severity.as_deref() {
            Some("BLOCKER") => details.blocker.push(detail),
            Some("CRITICAL") => details.critical.push(detail),
            Some("MAJOR") => details.major.push(detail),
            Some("MINOR") => details.minor.push(detail),
            _ => details.info.push(detail),
        }
    }

    ReportDocument {
        metadata: ReportMetadata {
            repository: repository.slug(),
            project_key: project_key.to_string(),
            analysis_date: analysed_at,
            sonarcloud_url: dashboard_url.to_string(),
        },
        summary: FindingsSummary {
            total_issues: issues.len(),
            bugs: count_type("BUG"),
            vulnerabilities: count_type("VULNERABILITY"),
            code_smells: count_type("CODE_SMELL"),
            security_hotspots: hotspots.len(),
        },
        metrics,
        issues: IssueBreakdown {
            by_severity: SeverityCounts {
                blocker: details.blocker.len(),
                critical: details.critical.len(),
                major: details.major.len(),
                minor: details.minor.len(),
                info: details.info.len(),
            },
            details,
        },
        security_hotspots: hotspots
            .iter()
            .map(|hotspot| HotspotDetail {
                message: hotspot.message.clone(),
                file: component_file(&hotspot.component),
                line: hotspot.line,
                status: hotspot.status.clone(),
                category: hotspot.security_category.clone(),
            })
            .collect(),
    }
}

/// `org_key:src/app.py` -> `src/app.py`
fn component_file(component: &str) -> String {
    component.rsplit(':').next().unwrap_or_default().to_string()
}

/// Writes reports into the project's `reports/` directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    paths: ProjectPaths,
}

impl ReportWriter {
    pub fn new(paths: ProjectPaths) -> Self {
        Self { paths }
    }

    /// Write the timestamped report and refresh the "latest" copy.
    /// Returns the timestamped path.
    pub fn save(&self, document: &ReportDocument) -> McpHubResult<PathBuf> {
        self.paths.ensure_reports_dir()?;

        let stamp = document.metadata.analysis_date.format("%Y%m%d_%H%M%S");
        let report_file = self.paths.reports_dir.join(format!(
            "full-analysis-{}-{}.json",
            document.metadata.repository, stamp
        ));
        let content = serde_json::to_string_pretty(document).map_err(|err| {
            errors::validation_error(format!("Failed to serialize report: {err}"), None)
        })?;

        write_file(&report_file, &content)?;
        info!("Report saved: {}", report_file.display());

        let latest = self.paths.latest_report();
        write_file(&latest, &content)?;
        info!("Latest report: {}", latest.display());

        Ok(report_file)
    }
}

fn write_file(path: &Path, content: &str) -> McpHubResult<()> {
    fs::write(path, content).map_err(|err| errors::filesystem_error("Failed to write report", path, err))
}

/// SonarCloud ratings are 1.0..5.0; A is best.
pub fn rating_letter(value: &str) -> Option<char> {
    let rating = value.trim().parse::<f64>().ok()? as u32;
    (1..=5)
        .contains(&rating)
        .then(|| char::from(b'A' + (rating - 1) as u8))
}

fn stars(letter: char) -> &'static str {
    match letter {
        'A' => "⭐⭐⭐⭐⭐",
        'B' => "⭐⭐⭐⭐",
        'C' => "⭐⭐⭐",
        'D' => "⭐⭐",
        _ => "⭐",
    }
}

/// Print the console summary shown after an analysis.
pub fn print_summary(document: &ReportDocument) {
    let summary = &document.summary;
    let metrics = &document.metrics;

    println!("\n{}", "=".repeat(70));
    println!("{}", "Analysis Summary".bold());
    println!("{}", "=".repeat(70));

    println!("\n📊 Issue Counts:");
    println!("   Total Issues:         {}", summary.total_issues);
    println!("   🐛 Bugs:              {}", summary.bugs);
    println!("   🔒 Vulnerabilities:   {}", summary.vulnerabilities);
    println!("   💨 Code Smells:       {}", summary.code_smells);
    println!("   🔐 Security Hotspots: {}", summary.security_hotspots);

    println!("\n📏 Code Metrics:");
    for (key, label, unit) in [
        ("ncloc", "Lines of Code", ""),
        ("complexity", "Complexity", ""),
        ("duplicated_lines_density", "Duplication", "%"),
        ("coverage", "Coverage", "%"),
    ] {
        if let Some(value) = metrics.get(key) {
            println!("   {:<21}{}{}", format!("{}:", label), value, unit);
        }
    }

    println!("\n🎯 Quality Ratings:");
    for (key, label) in [
        ("reliability_rating", "Reliability"),
        ("security_rating", "Security"),
        ("sqale_rating", "Maintainability"),
    ] {
        if let Some(letter) = metrics.get(key).and_then(|v| rating_letter(v)) {
            println!("   {:<21}{} {}", format!("{}:", label), letter, stars(letter));
        }
    }

    println!("\n🌐 {}", document.metadata.sonarcloud_url.cyan());
}
