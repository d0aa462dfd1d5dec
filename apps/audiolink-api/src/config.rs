//! Application configuration read from the environment

use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BUCKET: &str = "audiolink";
const DEFAULT_DATABASE_URL: &str = "sqlite://audiolink.db?mode=rwc";
const DEFAULT_MAX_UPLOAD_MB: u64 = 50;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Object store backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bucket holding the uploaded objects
    pub bucket: String,
    pub database_url: String,
    pub max_upload_bytes: u64,
    /// Directory for scratch copies used during duration extraction
    pub temp_dir: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
}

impl AppConfig {
    /// Read the configuration from process environment variables
    ///
    /// S3 endpoint and credentials are picked up separately by the AWS SDK
    /// (`AWS_ENDPOINT_URL`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_REGION`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let max_upload_mb = match lookup("AUDIOLINK_MAX_UPLOAD_MB") {
            Some(value) => parse(value, "AUDIOLINK_MAX_UPLOAD_MB")?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };
        let port = match lookup("API_PORT") {
            Some(value) => parse(value, "API_PORT")?,
            None => DEFAULT_PORT,
        };
        let store = match lookup("AUDIOLINK_STORE").as_deref() {
            None | Some("s3") => StoreBackend::S3,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "AUDIOLINK_STORE",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bucket: var("AUDIOLINK_BUCKET", DEFAULT_BUCKET),
            database_url: var("AUDIOLINK_DATABASE_URL", DEFAULT_DATABASE_URL),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            temp_dir: lookup("AUDIOLINK_TEMP_DIR").map(PathBuf::from),
            host: var("API_HOST", DEFAULT_HOST),
            port,
            store,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(value: String, name: &'static str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
