use serde::{Deserialize, Serialize};

/// Local project metadata written by `mcphub init` into `mcphub.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(rename = "lang", default = "default_language")]
    pub language: String,
    #[serde(default = "default_license")]
    pub license: String,
    #[serde(default = "default_entrypoint")]
    pub entrypoint: String,
    #[serde(default)]
    pub repository: RepositoryRef,
    /// Local-only; never published to the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRef {
    #[serde(rename = "type", default = "default_repository_type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
}

impl Default for RepositoryRef {
    fn default() -> Self {
        Self {
            kind: default_repository_type(),
            url: String::new(),
        }
    }
}

impl RepositoryRef {
    pub fn git(url: impl Into<String>) -> Self {
        Self {
            kind: default_repository_type(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub currency: String,
    pub amount: f64,
}

impl ServerDescriptor {
    pub fn repository_url(&self) -> &str {
        &self.repository.url
    }
}

pub const DEFAULT_VERSION: &str = "1.0.0";

pub fn default_language() -> String {
    "Python".to_string()
}

pub fn default_license() -> String {
    "MIT".to_string()
}

pub fn default_entrypoint() -> String {
    "main.py".to_string()
}

fn default_repository_type() -> String {
    "git".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_wire_field_names() {
        let descriptor = ServerDescriptor {
            name: "WeatherMCP".to_string(),
            version: "1.0.0".to_string(),
            description: "Weather".to_string(),
            author: "Ada".to_string(),
            language: "Python".to_string(),
            license: "MIT".to_string(),
            entrypoint: "server.py".to_string(),
            repository: RepositoryRef::git("https://github.com/acme/weather"),
            pricing: None,
        };
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["lang"], "Python");
        assert_eq!(value["repository"]["type"], "git");
        assert_eq!(value["repository"]["url"], "https://github.com/acme/weather");
        assert!(value.get("pricing").is_none());
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let descriptor: ServerDescriptor =
            serde_json::from_str(r#"{"name":"x","version":"0.1.0"}"#).unwrap();
        assert_eq!(descriptor.language, "Python");
        assert_eq!(descriptor.entrypoint, "main.py");
        assert_eq!(descriptor.repository_url(), "");
    }
}
