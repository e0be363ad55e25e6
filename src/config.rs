use std::time::Duration;

pub const PROGRAM_NAME: &str = "mcphub";

// Project-relative files
pub const DESCRIPTOR_FILE_NAME: &str = "mcphub.json";
pub const ENV_FILE_NAME: &str = ".env";
pub const REPORTS_DIR_NAME: &str = "reports";
pub const LATEST_REPORT_FILE_NAME: &str = "analysis-report.json";

// Registry layout: one object per server under this prefix
pub const REGISTRY_PREFIX: &str = "servers/";
pub const REGISTRY_SUFFIX: &str = ".json";

// Environment variables
pub const SONAR_TOKEN_ENV: &str = "SONAR_TOKEN";
pub const SONAR_ORGANIZATION_ENV: &str = "SONAR_ORGANIZATION";
pub const SONAR_HOST_ENV: &str = "SONAR_HOST_URL";
pub const S3_BUCKET_ENV: &str = "S3_BUCKET_NAME";
pub const LEGACY_BUCKET_ENV: &str = "AWS_BUCKET";
pub const AWS_ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION_ENV: &str = "AWS_REGION";
pub const S3_ENDPOINT_ENV: &str = "S3_ENDPOINT_URL";
pub const LAMBDA_BASE_URL_ENV: &str = "LAMBDA_BASE_URL";

pub const DEFAULT_SONAR_HOST: &str = "https://sonarcloud.io";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

// Analysis polling
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const MAX_ANALYSIS_WAIT: Duration = Duration::from_secs(60);
pub const SCANNER_TIMEOUT: Duration = Duration::from_secs(300);
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
// SonarCloud caps page size at 500
pub const SONAR_PAGE_SIZE: usize = 500;

// Editor config
pub const EDITOR_SERVERS_KEY: &str = "servers";
pub const EDITOR_TRANSPORT: &str = "http";
