//! Gateway configuration
//!
//! Read from the process environment after loading an optional `.env` file
//! from the working directory.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_API_KEY: &str = "default-api-key-12345-change-this";
pub const DEFAULT_ADMIN_KEY: &str = "admin-secret-key-change-this";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ARCHIVE_YEARS entry `{0}` is not a four-digit year")]
    InvalidYear(String),

    #[error("BIND_ADDR `{value}` is not a socket address: {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Archive root holding `{YYYY}/{MM-YYYY}/{TICKER}.csv`.
    pub data_dir: PathBuf,
    /// Year allowlist; `None` exposes every year directory found.
    pub archive_years: Option<Vec<u16>>,
    /// Operator-provisioned client keys.
    pub api_keys: Vec<String>,
    pub admin_key: String,
    pub api_keys_file: PathBuf,
    pub registrations_file: PathBuf,
    pub bind_addr: SocketAddr,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is not an error
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let archive_years = match lookup("ARCHIVE_YEARS") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_years(&raw)?),
            _ => None,
        };

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_raw.clone(),
                source,
            })?;

        Ok(Self {
            data_dir: lookup("DATA_DIR").unwrap_or_else(|| "data".into()).into(),
            archive_years,
            api_keys: split_keys(&lookup("API_KEYS").unwrap_or_else(|| DEFAULT_API_KEY.into())),
            admin_key: lookup("ADMIN_KEY")
                .unwrap_or_else(|| DEFAULT_ADMIN_KEY.into())
                .trim()
                .to_string(),
            api_keys_file: lookup("API_KEYS_FILE")
                .unwrap_or_else(|| "api_keys.json".into())
                .into(),
            registrations_file: lookup("REGISTRATIONS_FILE")
                .unwrap_or_else(|| "registrations.jsonl".into())
                .into(),
            bind_addr,
        })
    }

    pub fn uses_default_api_key(&self) -> bool {
        self.api_keys.iter().any(|k| k == DEFAULT_API_KEY)
    }

    pub fn uses_default_admin_key(&self) -> bool {
        self.admin_key == DEFAULT_ADMIN_KEY
    }
}

/// Split a comma-separated key list, trimming and dropping blanks.
pub fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

fn parse_years(raw: &str) -> Result<Vec<u16>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|y| !y.is_empty())
        .map(|y| {
            types::partition::parse_year_dir(y).ok_or_else(|| ConfigError::InvalidYear(y.to_string()))
        })
        .collect()
}
