//! API key store
//!
//! Valid keys are the union of operator-provisioned keys (fixed for the
//! process lifetime) and keys issued at runtime, which are persisted to a
//! JSON document `{ "keys": [...], "last_updated": ... }`.
//!
//! The persisted file is re-read on every verification so keys issued by a
//! sibling process become valid without restart. Issuance performs a
//! read-modify-write of that file under a single-writer lock and replaces it
//! atomically; concurrent issuances can therefore never drop each other's
//! keys.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, warn};

use crate::audit::{IssueSource, Registration, RegistrationLog};

/// Random bytes behind every issued key.
pub const KEY_ENTROPY_BYTES: usize = 32;
/// Visible prefix of a file key in admin listings.
pub const MASK_PREFIX_CHARS: usize = 8;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("Admin key missing. Please provide X-Admin-Key header.")]
    AdminMissing,

    #[error("Invalid admin key. Access denied.")]
    AdminInvalid,

    #[error("Failed to persist API key: {0}")]
    Persist(#[source] io::Error),

    #[error("Failed to record registration: {0}")]
    Audit(#[source] io::Error),
}

// ── Requests & listings ─────────────────────────────────────────────

/// Metadata supplied with an issuance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub client_name: String,
    pub email: Option<String>,
    pub purpose: Option<String>,
    pub source: IssueSource,
}

impl IssueRequest {
    pub fn register(client_name: String, email: Option<String>, purpose: Option<String>) -> Self {
        Self {
            client_name,
            email,
            purpose,
            source: IssueSource::Register,
        }
    }

    pub fn admin(client_name: String) -> Self {
        Self {
            client_name,
            email: None,
            purpose: None,
            source: IssueSource::Admin,
        }
    }
}

/// Admin view of the key set. Only operator-provisioned keys are disclosed
/// in full.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyListing {
    pub total_keys: usize,
    pub env_keys_count: usize,
    pub file_keys_count: usize,
    pub env_keys: Vec<String>,
    pub file_keys: Vec<String>,
    pub note: &'static str,
}

const LISTING_NOTE: &str = "Full keys are only shown in env_keys (from .env file). File keys are truncated for security.";

// ── Interface ───────────────────────────────────────────────────────

/// Credential store consulted by every authenticated request.
pub trait KeyStore: Send + Sync {
    /// Whether `presented` (trimmed) is a currently valid client key.
    fn verify(&self, presented: &str) -> bool;

    /// Check an admin credential. `None` or zero-length is missing,
    /// anything else that does not match (whitespace-only included) is
    /// invalid.
    fn authorize_admin(&self, presented: Option<&str>) -> Result<(), KeyStoreError>;

    /// Mint, persist and audit a new client key.
    fn issue(&self, request: IssueRequest) -> Result<String, KeyStoreError>;

    /// Current key set for the admin listing.
    fn list(&self) -> KeyListing;

    /// [`KeyStore::issue`] gated on the admin credential.
    fn issue_admin(
        &self,
        request: IssueRequest,
        admin: Option<&str>,
    ) -> Result<String, KeyStoreError> {
        self.authorize_admin(admin)?;
        self.issue(request)
    }

    /// [`KeyStore::list`] gated on the admin credential.
    fn list_keys(&self, admin: Option<&str>) -> Result<KeyListing, KeyStoreError> {
        self.authorize_admin(admin)?;
        Ok(self.list())
    }
}

// ── File-backed store ───────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyFile {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    last_updated: Option<String>,
}

/// [`KeyStore`] persisted to a flat JSON file with a JSON-lines audit log.
#[derive(Debug)]
pub struct FileKeyStore {
    env_keys: Vec<String>,
    env_set: HashSet<String>,
    admin_key: String,
    keys_path: PathBuf,
    audit: RegistrationLog,
    /// Serializes the read-modify-write of `keys_path`.
    write_lock: Mutex<()>,
}

impl FileKeyStore {
    /// Merge operator keys with whatever is already persisted.
    pub fn load(
        env_keys: impl IntoIterator<Item = String>,
        admin_key: impl Into<String>,
        keys_path: impl Into<PathBuf>,
        audit: RegistrationLog,
    ) -> Self {
        let mut seen = HashSet::new();
        let env_keys: Vec<String> = env_keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();

        let store = Self {
            env_set: seen,
            env_keys,
            admin_key: admin_key.into().trim().to_string(),
            keys_path: keys_path.into(),
            audit,
            write_lock: Mutex::new(()),
        };
        info!(
            env_keys = store.env_keys.len(),
            file_keys = store.file_keys().len(),
            path = %store.keys_path.display(),
            "loaded API key store"
        );
        store
    }

    pub fn keys_path(&self) -> &Path {
        &self.keys_path
    }

    pub fn audit_log(&self) -> &RegistrationLog {
        &self.audit
    }

    /// Persisted keys; unreadable or corrupt files count as empty.
    pub fn file_keys(&self) -> Vec<String> {
        read_key_file(&self.keys_path)
    }

    fn persist(&self, keys: Vec<String>) -> io::Result<()> {
        let doc = KeyFile {
            keys,
            last_updated: Some(Utc::now().to_rfc3339()),
        };
        write_atomically(&self.keys_path, &serde_json::to_vec_pretty(&doc)?)
    }
}

impl KeyStore for FileKeyStore {
    fn verify(&self, presented: &str) -> bool {
        let presented = presented.trim();
        if presented.is_empty() {
            return false;
        }
        self.env_set.contains(presented) || self.file_keys().iter().any(|k| k == presented)
    }

    fn authorize_admin(&self, presented: Option<&str>) -> Result<(), KeyStoreError> {
        let presented = match presented {
            Some(p) if !p.is_empty() => p.trim(),
            _ => return Err(KeyStoreError::AdminMissing),
        };
        // A blank configured secret disables admin access entirely
        if self.admin_key.is_empty() || presented.is_empty() {
            return Err(KeyStoreError::AdminInvalid);
        }
        if bool::from(presented.as_bytes().ct_eq(self.admin_key.as_bytes())) {
            Ok(())
        } else {
            Err(KeyStoreError::AdminInvalid)
        }
    }

    fn issue(&self, request: IssueRequest) -> Result<String, KeyStoreError> {
        let key = generate_key();

        {
            let _guard = self
                .write_lock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            let mut keys = self.file_keys();
            keys.push(key.clone());
            self.persist(keys).map_err(KeyStoreError::Persist)?;

            let entry = Registration::new(
                request.source,
                request.client_name,
                request.email,
                request.purpose,
                key.clone(),
            );
            self.audit.append(&entry).map_err(KeyStoreError::Audit)?;

            info!(
                registration_id = %entry.registration_id,
                source = ?entry.source,
                client = %entry.client_name,
                key = %mask_key(&key),
                "issued API key"
            );
        }

        Ok(key)
    }

    fn list(&self) -> KeyListing {
        let file_keys = self.file_keys();
        KeyListing {
            total_keys: self.env_keys.len() + file_keys.len(),
            env_keys_count: self.env_keys.len(),
            file_keys_count: file_keys.len(),
            env_keys: self.env_keys.clone(),
            file_keys: file_keys.iter().map(|k| mask_key(k)).collect(),
            note: LISTING_NOTE,
        }
    }
}

/// URL-safe token over [`KEY_ENTROPY_BYTES`] bytes from the OS RNG.
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// First [`MASK_PREFIX_CHARS`] characters followed by `...`.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(MASK_PREFIX_CHARS).collect();
    format!("{prefix}...")
}

fn read_key_file(path: &Path) -> Vec<String> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read API key file, treating as empty");
            return Vec::new();
        }
    };
    match serde_json::from_slice::<KeyFile>(&raw) {
        Ok(doc) => doc
            .keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "corrupt API key file, treating as empty");
            Vec::new()
        }
    }
}

/// Write via a sibling temp file and rename so readers never observe a
/// partial document.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let written = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    let result = written.and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        // The temp file may not exist if creation itself failed
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ADMIN: &str = "admin-secret";

    fn store(tmp: &TempDir, env: &[&str]) -> FileKeyStore {
        FileKeyStore::load(
            env.iter().map(|k| k.to_string()),
            ADMIN,
            tmp.path().join("api_keys.json"),
            RegistrationLog::new(tmp.path().join("registrations.jsonl")),
        )
    }

    fn register(name: &str) -> IssueRequest {
        IssueRequest::register(name.to_string(), None, Some("research".to_string()))
    }

    #[test]
    fn test_env_keys_verify_trimmed() {
        let tmp = TempDir::new().unwrap();
        let keys = store(&tmp, &[" alpha ", "beta"]);
        assert!(keys.verify("alpha"));
        assert!(keys.verify("  beta\t"));
        assert!(!keys.verify("gamma"));
        assert!(!keys.verify("   "));
    }

    #[test]
    fn test_env_duplicates_collapse() {
        let tmp = TempDir::new().unwrap();
        let keys = store(&tmp, &["alpha", "alpha ", "", "beta"]);
        assert_eq!(keys.list().env_keys, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_issued_key_verifies_immediately() {
        let tmp = TempDir::new().unwrap();
        let keys = store(&tmp, &["alpha"]);
        let issued = keys.issue(register("acme")).unwrap();
        assert!(keys.verify(&issued));

        // A second store over the same file sees it too
        let sibling = store(&tmp, &[]);
        assert!(sibling.verify(&issued));
    }

    #[test]
    fn test_key_shape() {
        let key = generate_key();
        // 32 bytes → 43 unpadded base64 characters
        assert_eq!(key.len(), 43);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(key, generate_key());
    }

    #[test]
    fn test_issue_appends_audit_entry() {
        let tmp = TempDir::new().unwrap();
        let keys = store(&tmp, &[]);
        let issued = keys.issue(register("acme")).unwrap();

        let entries = keys.audit_log().entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].client_name, "acme");
        assert_eq!(entries[0].purpose.as_deref(), Some("research"));
        assert_eq!(entries[0].api_key, issued);
        assert_eq!(entries[0].source, IssueSource::Register);
    }

    #[test]
    fn test_persisted_document_shape() {
        let tmp = TempDir::new().unwrap();
        let keys = store(&tmp, &[]);
        let issued = keys.issue(register("acme")).unwrap();

        let doc: serde_json::Value =
            serde_json::from_slice(&fs::read(keys.keys_path()).unwrap()).unwrap();
        assert_eq!(doc["keys"], serde_json::json!([issued]));
        assert!(doc["last_updated"].is_string());
    }

    #[test]
    fn test_corrupt_key_file_treated_as_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("api_keys.json"), b"{ this is not json").unwrap();
        let keys = store(&tmp, &["alpha"]);

        assert!(keys.file_keys().is_empty());
        assert!(keys.verify("alpha"));
        assert_eq!(keys.list().file_keys_count, 0);

        // Issuance recovers by starting a fresh list
        let issued = keys.issue(register("acme")).unwrap();
        assert_eq!(keys.file_keys(), vec![issued]);
    }

    #[test]
    fn test_persist_failure_is_distinct_error() {
        let tmp = TempDir::new().unwrap();
        // Parent of the key file is a regular file, so the write must fail
        fs::write(tmp.path().join("blocker"), b"").unwrap();
        let keys = FileKeyStore::load(
            Vec::new(),
            ADMIN,
            tmp.path().join("blocker").join("api_keys.json"),
            RegistrationLog::new(tmp.path().join("registrations.jsonl")),
        );
        let err = keys.issue(register("acme")).unwrap_err();
        assert!(matches!(err, KeyStoreError::Persist(_)));
        assert!(err.to_string().starts_with("Failed to persist API key"));
    }

    #[test]
    fn test_failed_persist_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A directory where the key file belongs makes the final rename fail
        let keys_path = tmp.path().join("api_keys.json");
        fs::create_dir(&keys_path).unwrap();
        let keys = FileKeyStore::load(
            Vec::new(),
            ADMIN,
            keys_path.clone(),
            RegistrationLog::new(tmp.path().join("registrations.jsonl")),
        );

        let err = keys.issue(register("acme")).unwrap_err();
        assert!(matches!(err, KeyStoreError::Persist(_)));
        assert!(!tmp.path().join("api_keys.json.tmp").exists());
        assert!(keys.audit_log().entries().unwrap().is_empty());
    }

    #[test]
    fn test_admin_authorization() {
        let tmp = TempDir::new().unwrap();
        let keys = store(&tmp, &[]);
        assert!(keys.authorize_admin(Some(ADMIN)).is_ok());
        assert!(keys.authorize_admin(Some("  admin-secret  ")).is_ok());
        assert!(matches!(keys.authorize_admin(None), Err(KeyStoreError::AdminMissing)));
        assert!(matches!(keys.authorize_admin(Some("")), Err(KeyStoreError::AdminMissing)));
        assert!(matches!(keys.authorize_admin(Some(" ")), Err(KeyStoreError::AdminInvalid)));
        assert!(matches!(
            keys.authorize_admin(Some("admin-secre")),
            Err(KeyStoreError::AdminInvalid)
        ));
    }

    #[test]
    fn test_blank_admin_secret_rejects_everything() {
        let tmp = TempDir::new().unwrap();
        let keys = FileKeyStore::load(
            Vec::new(),
            "   ",
            tmp.path().join("api_keys.json"),
            RegistrationLog::new(tmp.path().join("registrations.jsonl")),
        );
        assert!(matches!(
            keys.authorize_admin(Some("anything")),
            Err(KeyStoreError::AdminInvalid)
        ));
    }

    #[test]
    fn test_issue_admin_requires_credential() {
        let tmp = TempDir::new().unwrap();
        let keys = store(&tmp, &[]);
        assert!(matches!(
            keys.issue_admin(IssueRequest::admin("ops".into()), None),
            Err(KeyStoreError::AdminMissing)
        ));
        assert!(matches!(
            keys.issue_admin(IssueRequest::admin("ops".into()), Some("wrong")),
            Err(KeyStoreError::AdminInvalid)
        ));
        assert!(keys.file_keys().is_empty());

        let issued = keys
            .issue_admin(IssueRequest::admin("ops".into()), Some(ADMIN))
            .unwrap();
        assert!(keys.verify(&issued));
        assert_eq!(keys.audit_log().entries().unwrap()[0].source, IssueSource::Admin);
    }

    #[test]
    fn test_listing_masks_file_keys() {
        let tmp = TempDir::new().unwrap();
        let keys = store(&tmp, &["operator-key-1"]);
        let issued = keys.issue(register("acme")).unwrap();

        let listing = keys.list_keys(Some(ADMIN)).unwrap();
        assert_eq!(listing.total_keys, 2);
        assert_eq!(listing.env_keys_count, 1);
        assert_eq!(listing.file_keys_count, 1);
        assert_eq!(listing.env_keys, vec!["operator-key-1"]);
        assert_eq!(listing.file_keys, vec![format!("{}...", &issued[..8])]);
        assert!(keys.list_keys(None).is_err());
    }

    #[test]
    fn test_mask_short_key() {
        assert_eq!(mask_key("abc"), "abc...");
        assert_eq!(mask_key("abcdefghijk"), "abcdefgh...");
    }
}
