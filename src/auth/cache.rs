//! File-backed credential cache scoped to an endpoint identity.

use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::token::TokenSet;
use crate::error::KeyforgeError;

/// Identity a cached credential is scoped to.
///
/// A record whose identity does not exactly match the session's is ignored
/// wholesale; the session then proceeds as unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointIdentity {
    pub realm: String,
    pub client_id: String,
}

/// Single-record credential cache at a platform-specific location.
///
/// Both operations are best-effort: `load` maps every failure to a miss,
/// and callers treat `save` failures as log-and-continue. Caching never
/// blocks the authenticated flow. The disabled variant (`--no-cache`)
/// never reads or writes.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    path: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    realm: String,
    client_id: String,
    token: TokenSet,
}

impl CredentialCache {
    /// Cache backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Cache that never reads or writes.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Default cache file under the platform user cache directory.
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.cache_dir().join("keyforge"))
            .unwrap_or_else(|| PathBuf::from(".keyforge"))
            .join("token.json")
    }

    /// Load the cached token set, if one exists for `identity`.
    ///
    /// A missing file, unreadable or unparsable record, and an identity
    /// mismatch all yield `None`.
    pub fn load(&self, identity: &EndpointIdentity) -> Option<TokenSet> {
        let path = self.path.as_ref()?;
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to read credential cache");
                return None;
            }
        };
        let record: CacheRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to parse credential cache");
                return None;
            }
        };
        if record.realm != identity.realm || record.client_id != identity.client_id {
            tracing::debug!(
                cached_realm = %record.realm,
                cached_client_id = %record.client_id,
                "Cached credential belongs to a different endpoint; ignoring"
            );
            return None;
        }
        Some(record.token)
    }

    /// Overwrite the single cache record.
    pub fn save(&self, identity: &EndpointIdentity, token: &TokenSet) -> Result<(), KeyforgeError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let record = CacheRecord {
            realm: identity.realm.clone(),
            client_id: identity.client_id.clone(),
            token: token.clone(),
        };
        let serialized =
            serde_json::to_vec(&record).map_err(|err| KeyforgeError::Cache(err.to_string()))?;
        atomic_write(path, &serialized).map_err(|err| KeyforgeError::Cache(err.to_string()))?;
        tracing::debug!(path = %path.display(), "Token cached");
        Ok(())
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "cache path has no file name")
    })?;
    let temp_name = format!(".{}.tmp-{}", file_name.to_string_lossy(), std::process::id());
    let temp_path = path.with_file_name(temp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}
