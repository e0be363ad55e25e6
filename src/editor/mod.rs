//! 编辑器MCP配置集成
//!
//! Merges registry servers into VS Code's `mcp.json`. Only the entry for the
//! pulled server changes; everything else in the file is kept as-is,
//! including key order.

pub mod paths;

pub use paths::{editor_config_path, Os};

use crate::config::{EDITOR_SERVERS_KEY, EDITOR_TRANSPORT};
use crate::error::{errors, McpHubResult};
use crate::prompt::Confirmer;
use serde_json::{json, Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `{base}/{name}`
pub fn invocation_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

/// Entry written under `servers.{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfigEntry {
    pub name: String,
    pub url: String,
    pub transport: String,
}

impl EditorConfigEntry {
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            transport: EDITOR_TRANSPORT.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": self.transport,
            "url": self.url,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryChange {
    Added,
    Updated,
    Unchanged,
}

/// MCP配置文件编辑器
#[derive(Debug, Clone)]
pub struct EditorConfig {
    config_path: PathBuf,
}

impl EditorConfig {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Config for the current user on `os`.
    pub fn for_os(os: Os) -> McpHubResult<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            errors::validation_error("Cannot find home directory", None)
        })?;
        Ok(Self::new(editor_config_path(os, &home)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 读取配置文件
    ///
    /// Missing, unreadable or non-object files read as an empty document.
    pub fn read(&self) -> Map<String, Value> {
        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No editor config at {}", self.config_path.display());
                return Map::new();
            }
            Err(err) => {
                warn!(
                    "Cannot read {}, starting from an empty config: {}",
                    self.config_path.display(),
                    err
                );
                return Map::new();
            }
        };

        if content.trim().is_empty() {
            return Map::new();
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(
                    "{} is not a JSON object, starting from an empty config",
                    self.config_path.display()
                );
                Map::new()
            }
            Err(err) => {
                warn!(
                    "{} is not valid JSON ({}), starting from an empty config",
                    self.config_path.display(),
                    err
                );
                Map::new()
            }
        }
    }

    /// 写入配置文件
    ///
    /// Tab-indented like the editor's own output. Written to a temp file in
    /// the same directory and renamed over the target.
    pub fn write(&self, config: &Map<String, Value>) -> McpHubResult<()> {
        let dir = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&dir)
            .map_err(|err| errors::filesystem_error("Failed to create config directory", &dir, err))?;

        let content = to_tab_indented(config)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|err| errors::filesystem_error("Failed to create temp file", &dir, err))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|err| errors::filesystem_error("Failed to write temp file", temp.path(), err))?;
        temp.persist(&self.config_path).map_err(|err| {
            errors::filesystem_error("Failed to replace editor config", &self.config_path, err.error)
        })?;
        Ok(())
    }

    /// Current entry for `name`, if any.
    pub fn entry(&self, name: &str) -> Option<Value> {
        self.read()
            .get(EDITOR_SERVERS_KEY)
            .and_then(|servers| servers.get(name))
            .cloned()
    }

    /// Set `servers.{name}` and write the file. Other keys are untouched.
    pub fn merge(&self, entry: &EditorConfigEntry) -> McpHubResult<EntryChange> {
        let mut config = self.read();
        let change = merge_entry(&mut config, entry);
        if change != EntryChange::Unchanged {
            self.write(&config)?;
        }
        Ok(change)
    }
}

/// In-memory merge; returns what happened to the entry.
pub fn merge_entry(config: &mut Map<String, Value>, entry: &EditorConfigEntry) -> EntryChange {
    let servers = config
        .entry(EDITOR_SERVERS_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !servers.is_object() {
        warn!("'{}' is not an object; replacing it", EDITOR_SERVERS_KEY);
        *servers = Value::Object(Map::new());
    }

    let value = entry.to_value();
    match servers.as_object_mut() {
        Some(servers) => match servers.insert(entry.name.clone(), value.clone()) {
            None => EntryChange::Added,
            Some(previous) if previous == value => EntryChange::Unchanged,
            Some(_) => EntryChange::Updated,
        },
        None => EntryChange::Unchanged,
    }
}

fn to_tab_indented(config: &Map<String, Value>) -> McpHubResult<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(config, &mut serializer).map_err(|err| {
        errors::validation_error(format!("Failed to serialize editor config: {err}"), None)
    })?;
    buffer.push(b'\n');
    String::from_utf8(buffer)
        .map_err(|err| errors::validation_error(format!("Invalid UTF-8 in editor config: {err}"), None))
}

/// Result of wiring a server into the editor.
#[derive(Debug, Clone)]
pub struct Integration {
    pub entry: EditorConfigEntry,
    pub config_path: PathBuf,
    pub change: EntryChange,
}

/// Derives invocation URLs and writes them into the editor config.
#[derive(Debug, Clone)]
pub struct EditorIntegrator {
    base_url: String,
    config: EditorConfig,
}

impl EditorIntegrator {
    pub fn new(base_url: impl Into<String>, config: EditorConfig) -> Self {
        Self {
            base_url: base_url.into(),
            config,
        }
    }

    pub fn config_path(&self) -> &Path {
        self.config.config_path()
    }

    pub fn entry_for(&self, name: &str) -> EditorConfigEntry {
        EditorConfigEntry::http(name, invocation_url(&self.base_url, name))
    }

    /// Add or refresh the entry for `name`. An existing, different entry is
    /// only replaced with `force` or the user's confirmation; declining is
    /// `Aborted` and leaves the file alone.
    pub fn integrate(
        &self,
        name: &str,
        force: bool,
        confirmer: &dyn Confirmer,
    ) -> McpHubResult<Integration> {
        let entry = self.entry_for(name);

        if let Some(existing) = self.config.entry(name) {
            if existing != entry.to_value() && !force {
                let question = format!(
                    "Server '{}' already exists in {}. Overwrite it?",
                    name,
                    self.config.config_path().display()
                );
                if !confirmer.confirm(&question)? {
                    return Err(errors::aborted(format!("editor entry for '{}' left unchanged", name)));
                }
            }
        }

        let change = self.config.merge(&entry)?;
        Ok(Integration {
            entry,
            config_path: self.config.config_path().to_path_buf(),
            change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn integrator(temp: &TempDir) -> EditorIntegrator {
        EditorIntegrator::new(
            "https://lambda.example.com/",
            EditorConfig::new(temp.path().join("Code/User/mcp.json")),
        )
    }

    #[test]
    fn invocation_url_joins_base_and_name() {
        assert_eq!(
            invocation_url("https://lambda.example.com/", "WeatherMCP"),
            "https://lambda.example.com/WeatherMCP"
        );
        assert_eq!(invocation_url("https://x", "a"), "https://x/a");
    }

    #[test]
    fn merge_keeps_unrelated_entries_and_updates_in_place() {
        let mut config: Map<String, Value> = serde_json::from_value(json!({
            "inputs": [],
            "servers": {"other": {"type": "stdio", "command": "other-mcp"}}
        }))
        .unwrap();

        let first = EditorConfigEntry::http("WeatherMCP", "https://a/WeatherMCP");
        assert_eq!(merge_entry(&mut config, &first), EntryChange::Added);
        assert_eq!(merge_entry(&mut config, &first), EntryChange::Unchanged);

        let second = EditorConfigEntry::http("WeatherMCP", "https://b/WeatherMCP");
        assert_eq!(merge_entry(&mut config, &second), EntryChange::Updated);

        assert_eq!(
            Value::Object(config),
            json!({
                "inputs": [],
                "servers": {
                    "other": {"type": "stdio", "command": "other-mcp"},
                    "WeatherMCP": {"type": "http", "url": "https://b/WeatherMCP"}
                }
            })
        );
    }

    #[test]
    fn integrate_creates_missing_file_tab_indented() {
        let temp = TempDir::new().unwrap();
        let integrator = integrator(&temp);

        let result = integrator
            .integrate("WeatherMCP", false, &|_: &str| -> bool { panic!("no prompt") })
            .unwrap();

        assert_eq!(result.change, EntryChange::Added);
        assert_eq!(result.entry.url, "https://lambda.example.com/WeatherMCP");
        let written = std::fs::read_to_string(integrator.config_path()).unwrap();
        assert!(written.starts_with("{\n\t\"servers\""));
    }

    #[test]
    fn corrupt_file_is_replaced_not_fatal() {
        let temp = TempDir::new().unwrap();
        let integrator = integrator(&temp);
        std::fs::create_dir_all(integrator.config_path().parent().unwrap()).unwrap();
        std::fs::write(integrator.config_path(), "{ not json").unwrap();

        let result = integrator.integrate("WeatherMCP", false, &|_: &str| true).unwrap();

        assert_eq!(result.change, EntryChange::Added);
        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(integrator.config_path()).unwrap()).unwrap();
        assert_eq!(value["servers"]["WeatherMCP"]["type"], "http");
    }

    #[test]
    fn differing_entry_needs_confirmation() {
        let temp = TempDir::new().unwrap();
        let integrator = integrator(&temp);
        let config = EditorConfig::new(integrator.config_path());
        config
            .merge(&EditorConfigEntry::http("WeatherMCP", "https://old/WeatherMCP"))
            .unwrap();
        let before = std::fs::read(integrator.config_path()).unwrap();

        let err = integrator
            .integrate("WeatherMCP", false, &|_: &str| false)
            .unwrap_err();
        assert_eq!(err.exit_code(), 0);
        assert_eq!(std::fs::read(integrator.config_path()).unwrap(), before);

        let forced = integrator
            .integrate("WeatherMCP", true, &|_: &str| -> bool { panic!("no prompt") })
            .unwrap();
        assert_eq!(forced.change, EntryChange::Updated);
    }

    #[test]
    fn same_entry_is_not_rewritten_or_asked() {
        let temp = TempDir::new().unwrap();
        let integrator = integrator(&temp);
        integrator.integrate("WeatherMCP", false, &|_: &str| true).unwrap();

        let again = integrator
            .integrate("WeatherMCP", false, &|_: &str| -> bool { panic!("no prompt") })
            .unwrap();
        assert_eq!(again.change, EntryChange::Unchanged);
    }
}
