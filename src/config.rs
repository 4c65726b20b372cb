use crate::error::ConfigError;
use log::LevelFilter;
use std::fmt;
use std::path::Path;

const DEFAULT_REGION: &str = "us-east-1";

/// Access keys for the object store.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Process settings, read once before any pipeline stage runs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_level: LevelFilter,
    pub bucket: Option<String>,
    pub credentials: Option<Credentials>,
    pub region: String,
    pub endpoint: Option<String>,
}

impl Settings {
    /// Loads `env_file` into the process environment (a missing file is ignored)
    /// and builds settings from the environment.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        match dotenvy::from_path(env_file) {
            Ok(()) => {}
            Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ConfigError::EnvFile(e)),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_level = match get("LOG_LEVEL") {
            Some(raw) => parse_level(&raw).ok_or(ConfigError::Invalid {
                var: "LOG_LEVEL",
                value: raw,
            })?,
            None => LevelFilter::Info,
        };

        let credentials = match (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id,
                secret_access_key,
                session_token: get("AWS_SESSION_TOKEN"),
            }),
            (Some(_), None) => return Err(ConfigError::Missing("AWS_SECRET_ACCESS_KEY")),
            (None, Some(_)) => return Err(ConfigError::Missing("AWS_ACCESS_KEY_ID")),
            (None, None) => None,
        };

        let region = get("AWS_REGION")
            .or_else(|| get("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        if !is_region_name(&region) {
            return Err(ConfigError::Invalid {
                var: "AWS_REGION",
                value: region,
            });
        }

        Ok(Self {
            log_level,
            bucket: get("S3_BUCKET_NAME"),
            credentials,
            region,
            endpoint: get("S3_ENDPOINT_URL"),
        })
    }

    pub fn bucket(&self) -> Result<&str, ConfigError> {
        self.bucket
            .as_deref()
            .ok_or(ConfigError::Missing("S3_BUCKET_NAME"))
    }

    pub fn credentials(&self) -> Result<&Credentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::Missing("AWS_ACCESS_KEY_ID"))
    }
}

/// Region identifiers look like `us-east-1` or `eu-central-2`.
fn is_region_name(region: &str) -> bool {
    region
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !region.starts_with('-')
        && !region.ends_with('-')
}

/// Accepts Rust level names plus the Python spellings used in existing `.env` files.
fn parse_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "WARNING" => Some(LevelFilter::Warn),
        "CRITICAL" | "FATAL" => Some(LevelFilter::Error),
        "NOTSET" => Some(LevelFilter::Trace),
        other => other.parse().ok(),
    }
}
