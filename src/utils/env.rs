//! Environment settings
//!
//! Credentials and endpoints come from the process environment, optionally
//! seeded from a `.env` file in the project directory.

use crate::analysis::sonar::SonarCredentials;
use crate::config::*;
use crate::error::{errors, McpHubResult};
use crate::registry::s3::S3Config;
use std::path::Path;
use tracing::debug;

/// Load `.env` into the process environment. Variables that are already set
/// win over the file. Returns whether a file was loaded.
pub fn load_env_file(path: &Path) -> bool {
    if !path.exists() {
        debug!("No env file at {}", path.display());
        return false;
    }
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!("Loaded env file {}", path.display());
            true
        }
        Err(err) => {
            tracing::warn!("Ignoring unreadable env file {}: {}", path.display(), err);
            false
        }
    }
}

/// Snapshot of every setting mcphub understands.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub sonar_token: Option<String>,
    pub sonar_organization: Option<String>,
    pub sonar_host: Option<String>,
    pub bucket: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
    pub aws_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub lambda_base_url: Option<String>,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            sonar_token: get(SONAR_TOKEN_ENV),
            sonar_organization: get(SONAR_ORGANIZATION_ENV),
            sonar_host: get(SONAR_HOST_ENV),
            bucket: get(S3_BUCKET_ENV).or_else(|| get(LEGACY_BUCKET_ENV)),
            aws_access_key_id: get(AWS_ACCESS_KEY_ENV),
            aws_secret_access_key: get(AWS_SECRET_KEY_ENV),
            aws_session_token: get(AWS_SESSION_TOKEN_ENV),
            aws_region: get(AWS_REGION_ENV),
            s3_endpoint: get(S3_ENDPOINT_ENV),
            lambda_base_url: get(LAMBDA_BASE_URL_ENV),
        }
    }

    /// SonarCloud credentials; token and organization are required.
    pub fn sonar(&self) -> McpHubResult<SonarCredentials> {
        let token = self
            .sonar_token
            .clone()
            .ok_or_else(|| errors::missing_env(SONAR_TOKEN_ENV))?;
        let organization = self
            .sonar_organization
            .clone()
            .ok_or_else(|| errors::missing_env(SONAR_ORGANIZATION_ENV))?;
        Ok(SonarCredentials {
            host: self
                .sonar_host
                .clone()
                .unwrap_or_else(|| DEFAULT_SONAR_HOST.to_string()),
            token,
            organization,
        })
    }

    /// Bucket from the `--bucket` flag, falling back to the environment.
    pub fn bucket(&self, flag: Option<String>) -> McpHubResult<String> {
        flag.filter(|bucket| !bucket.trim().is_empty())
            .or_else(|| self.bucket.clone())
            .ok_or_else(|| errors::missing_env(S3_BUCKET_ENV))
    }

    /// S3 connection settings for the given bucket.
    pub fn s3(&self, bucket: String) -> McpHubResult<S3Config> {
        let access_key_id = self
            .aws_access_key_id
            .clone()
            .ok_or_else(|| errors::missing_env(AWS_ACCESS_KEY_ENV))?;
        let secret_access_key = self
            .aws_secret_access_key
            .clone()
            .ok_or_else(|| errors::missing_env(AWS_SECRET_KEY_ENV))?;
        Ok(S3Config {
            bucket,
            region: self
                .aws_region
                .clone()
                .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            access_key_id,
            secret_access_key,
            session_token: self.aws_session_token.clone(),
            endpoint: self.s3_endpoint.clone(),
        })
    }

    /// Base URL of the invocation service.
    pub fn lambda_base_url(&self) -> McpHubResult<String> {
        self.lambda_base_url
            .clone()
            .ok_or_else(|| errors::missing_env(LAMBDA_BASE_URL_ENV))
    }
}
