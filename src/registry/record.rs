use crate::analysis::{AnalysisReport, FindingsSummary};
use crate::config::EDITOR_TRANSPORT;
use crate::descriptor::{RepositoryRef, ServerDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One published server, stored as `servers/{name}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(rename = "lang", default)]
    pub language: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub entrypoint: String,
    #[serde(default)]
    pub repository: RepositoryRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation: Option<Invocation>,
    pub meta: RecordMeta,
}

/// Findings published alongside the record; the full report stays local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub project_key: String,
    pub analysed_at: DateTime<Utc>,
    pub dashboard_url: String,
    #[serde(flatten)]
    pub counts: FindingsSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(rename = "type")]
    pub transport: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RegistryRecord {
    /// Build a fresh record. Pricing never leaves the project.
    pub fn from_descriptor(
        descriptor: &ServerDescriptor,
        analysis: Option<&AnalysisReport>,
        invocation_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: descriptor.name.clone(),
            version: descriptor.version.clone(),
            description: descriptor.description.clone(),
            author: descriptor.author.clone(),
            language: descriptor.language.clone(),
            license: descriptor.license.clone(),
            entrypoint: descriptor.entrypoint.clone(),
            repository: descriptor.repository.clone(),
            analysis: analysis.map(|report| AnalysisSummary {
                project_key: report.project_key.clone(),
                analysed_at: report.timestamp,
                dashboard_url: report.dashboard_url.clone(),
                counts: report.summary.clone(),
            }),
            invocation: invocation_url.map(|url| Invocation {
                transport: EDITOR_TRANSPORT.to_string(),
                url,
            }),
            meta: RecordMeta {
                created_at: now,
                updated_at: now,
            },
        }
    }

    /// Keep the first publication time when replacing `previous`.
    pub fn inherit_created_at(&mut self, previous: &RegistryRecord) {
        self.meta.created_at = previous.meta.created_at;
    }

    pub fn repository_url(&self) -> &str {
        &self.repository.url
    }
}
