//! Server registry
//!
//! One JSON object per server under `servers/{name}.json` in an object
//! store. The name is the uniqueness key: replacing a record needs either
//! `--force` or an explicit confirmation.

pub mod record;
pub mod s3;

pub use record::{AnalysisSummary, Invocation, RecordMeta, RegistryRecord};
pub use s3::{S3Config, S3Store};

use crate::config::{REGISTRY_PREFIX, REGISTRY_SUFFIX};
use crate::descriptor::validation::validate_name;
use crate::error::{errors, McpHubError, McpHubResult};
use crate::prompt::Confirmer;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Minimal blob store the registry needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> McpHubResult<Option<Vec<u8>>>;

    async fn put(&self, key: &str, body: Vec<u8>) -> McpHubResult<()>;

    async fn exists(&self, key: &str) -> McpHubResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// All keys starting with `prefix`.
    async fn list(&self, prefix: &str) -> McpHubResult<Vec<String>>;
}

/// Process-local store for tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    writes: Mutex<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, body: Vec<u8>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(key.into(), body);
        }
    }

    /// Number of `put` calls served.
    pub fn writes(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get(&self, key: &str) -> McpHubResult<Option<Vec<u8>>> {
        Ok(self.object(key))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> McpHubResult<()> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| errors::store_write_error(key, "store lock poisoned"))?;
        objects.insert(key.to_string(), body);
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> McpHubResult<Vec<String>> {
        let objects = self
            .objects
            .lock()
            .map_err(|_| errors::store_read_error(prefix, "store lock poisoned"))?;
        Ok(objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Canonical object key for a server name.
pub fn record_key(name: &str) -> String {
    format!("{}{}{}", REGISTRY_PREFIX, name, REGISTRY_SUFFIX)
}

/// Canonical key for a name that can round-trip through [`name_from_key`].
fn checked_key(name: &str) -> McpHubResult<String> {
    validate_name(name).map_err(|reason| errors::validation_error(reason, Some("name")))?;
    Ok(record_key(name))
}

/// Server name for a canonical key, if it is one.
pub fn name_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(REGISTRY_PREFIX)?
        .strip_suffix(REGISTRY_SUFFIX)
        .filter(|name| !name.is_empty() && !name.contains('/'))
}

/// Order names by closeness to `wanted`: case-insensitive exact match, then
/// substring matches (either direction), then everything else; alphabetical
/// within each group.
pub fn rank_suggestions(wanted: &str, names: Vec<String>) -> Vec<String> {
    let wanted = wanted.to_lowercase();
    let mut ranked: Vec<(u8, String)> = names
        .into_iter()
        .map(|name| {
            let lower = name.to_lowercase();
            let rank = if lower == wanted {
                0
            } else if !wanted.is_empty() && (lower.contains(&wanted) || wanted.contains(&lower)) {
                1
            } else {
                2
            };
            (rank, name)
        })
        .collect();
    ranked.sort();
    ranked.into_iter().map(|(_, name)| name).collect()
}

/// Outcome of the pre-analysis existence check.
#[derive(Debug, Clone)]
pub struct PushPlan {
    pub key: String,
    /// Record being replaced, when one exists and could be read.
    pub previous: Option<RegistryRecord>,
    pub replacing: bool,
}

#[derive(Debug, Clone)]
pub struct PushAck {
    pub key: String,
    pub replaced: bool,
    pub record: RegistryRecord,
}

/// Push/search/pull against an [`ObjectStore`].
#[derive(Clone)]
pub struct RegistryClient {
    store: Arc<dyn ObjectStore>,
}

impl RegistryClient {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Read the record for `name`; `Ok(None)` when absent.
    pub async fn fetch(&self, name: &str) -> McpHubResult<Option<RegistryRecord>> {
        let key = checked_key(name)?;
        debug!("Fetching {}", key);
        match self.store.get(&key).await? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|err| errors::store_read_error(&key, format!("malformed record: {}", err))),
        }
    }

    /// Names of every published server, alphabetical.
    pub async fn names(&self) -> McpHubResult<Vec<String>> {
        let mut names: Vec<String> = self
            .store
            .list(REGISTRY_PREFIX)
            .await?
            .iter()
            .filter_map(|key| name_from_key(key))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Existence check and overwrite confirmation. Declining is `Aborted`
    /// and the store is not touched.
    pub async fn prepare_push(
        &self,
        name: &str,
        force: bool,
        confirmer: &dyn Confirmer,
    ) -> McpHubResult<PushPlan> {
        let key = checked_key(name)?;
        if !self.store.exists(&key).await? {
            return Ok(PushPlan {
                key,
                previous: None,
                replacing: false,
            });
        }

        if force {
            info!("Server '{}' exists; --force set, overwriting", name);
        } else {
            let question = format!("Server '{}' already exists in the registry. Overwrite it?", name);
            if !confirmer.confirm(&question)? {
                return Err(errors::aborted(format!("server '{}' left unchanged", name)));
            }
        }

        let previous = match self.fetch(name).await {
            Ok(previous) => previous,
            Err(err) => {
                warn!("Existing record for '{}' unreadable, replacing it: {}", name, err);
                None
            }
        };
        Ok(PushPlan {
            key,
            previous,
            replacing: true,
        })
    }

    /// Upload `record` under the plan's key, keeping the original
    /// `created_at` of a replaced record.
    pub async fn upload(&self, plan: PushPlan, mut record: RegistryRecord) -> McpHubResult<PushAck> {
        if let Some(previous) = &plan.previous {
            record.inherit_created_at(previous);
        }
        let body = serde_json::to_vec_pretty(&record)
            .map_err(|err| errors::store_write_error(&plan.key, err.to_string()))?;
        self.store.put(&plan.key, body).await?;
        info!("Published {}", plan.key);

        Ok(PushAck {
            key: plan.key,
            replaced: plan.replacing,
            record,
        })
    }

    pub async fn push(
        &self,
        record: RegistryRecord,
        force: bool,
        confirmer: &dyn Confirmer,
    ) -> McpHubResult<PushAck> {
        let plan = self.prepare_push(&record.name, force, confirmer).await?;
        self.upload(plan, record).await
    }

    /// Record for `name`, or the available names as suggestions.
    pub async fn search(&self, name: &str) -> McpHubResult<RegistryRecord> {
        if let Some(record) = self.fetch(name).await? {
            return Ok(record);
        }
        let suggestions = rank_suggestions(name, self.names().await?);
        Err(McpHubError::NotFoundWithSuggestions {
            name: name.to_string(),
            suggestions,
        })
    }

    /// Record for `name`; no discovery fallback.
    pub async fn pull(&self, name: &str) -> McpHubResult<RegistryRecord> {
        self.fetch(name)
            .await?
            .ok_or_else(|| McpHubError::NotFound {
                name: name.to_string(),
            })
    }
}
