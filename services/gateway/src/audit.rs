//! Registration audit log
//!
//! One JSON object per line, opened in append mode for every entry. The log
//! is never read back on the write path, so concurrent writers cannot lose
//! each other's entries.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Which workflow issued a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSource {
    /// Public self-serve `/register`.
    Register,
    /// Admin-only `/admin/generate-key`.
    Admin,
}

/// A single issuance event. Write-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub registration_id: Uuid,
    pub source: IssueSource,
    pub client_name: String,
    pub email: Option<String>,
    pub purpose: Option<String>,
    pub api_key: String,
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        source: IssueSource,
        client_name: String,
        email: Option<String>,
        purpose: Option<String>,
        api_key: String,
    ) -> Self {
        Self {
            registration_id: Uuid::now_v7(),
            source,
            client_name,
            email,
            purpose,
            api_key,
            registered_at: Utc::now(),
        }
    }
}

/// Append-only JSON-lines file of [`Registration`]s.
#[derive(Debug, Clone)]
pub struct RegistrationLog {
    path: PathBuf,
}

impl RegistrationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &Registration) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // One write per entry keeps lines whole under O_APPEND
        file.write_all(line.as_bytes())?;
        file.sync_data()
    }

    /// Every readable entry in write order. Unparseable lines are skipped.
    pub fn entries(&self) -> io::Result<Vec<Registration>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let mut entries = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!(line = idx + 1, error = %err, "skipping unreadable audit entry"),
            }
        }
        Ok(entries)
    }
}
