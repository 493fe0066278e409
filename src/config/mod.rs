//! Environment-backed settings and the first-run `.env` writer.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{KeyforgeError, Result};

const ENV_URL: &str = "KEYCLOAK_URL";
const ENV_REALM: &str = "KEYCLOAK_REALM";
const ENV_CLIENT_ID: &str = "KEYCLOAK_CLIENT_ID";

/// Connection settings for the identity service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the Keycloak server.
    pub base_url: String,
    /// Realm the operator logs in against.
    pub login_realm: String,
    /// Client id used for the device-authorization grant.
    pub client_id: String,
}

impl Settings {
    /// Load settings, reading an env file first.
    ///
    /// An explicit `env_file` wins; otherwise the `.env` in the platform
    /// config directory is loaded, and its absence is a configuration
    /// error pointing at `init-env`.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|err| {
                    KeyforgeError::Configuration(format!(
                        "failed to load env file {}: {err}",
                        path.display()
                    ))
                })?;
                tracing::info!(path = %path.display(), "Loaded environment from provided env file");
            }
            None => {
                let path = default_env_path();
                if !path.exists() {
                    return Err(KeyforgeError::Configuration(format!(
                        "no .env file found at {}; run 'keyforge init-env' to create one",
                        path.display()
                    )));
                }
                dotenvy::from_path(&path).map_err(|err| {
                    KeyforgeError::Configuration(format!(
                        "failed to load env file {}: {err}",
                        path.display()
                    ))
                })?;
                tracing::info!(path = %path.display(), "Loaded environment from default env file");
            }
        }

        Ok(Self {
            base_url: require_var(ENV_URL)?,
            login_realm: require_var(ENV_REALM)?,
            client_id: require_var(ENV_CLIENT_ID)?,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| KeyforgeError::Configuration(format!("{name} is not set")))
}

/// Default `.env` location under the platform config directory.
pub fn default_env_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("keyforge"))
        .unwrap_or_else(|| PathBuf::from(".keyforge"))
        .join(".env")
}

/// Write a `.env` file with the three connection settings, creating parent
/// directories as needed.
pub fn write_env_file(path: &Path, base_url: &str, realm: &str, client_id: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    writeln!(file, "{ENV_URL}={base_url}")?;
    writeln!(file, "{ENV_REALM}={realm}")?;
    writeln!(file, "{ENV_CLIENT_ID}={client_id}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_env_file_emits_three_assignments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(".env");
        write_env_file(&path, "https://sso.example.com", "master", "admin-cli").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "KEYCLOAK_URL=https://sso.example.com\nKEYCLOAK_REALM=master\nKEYCLOAK_CLIENT_ID=admin-cli\n"
        );
    }

    #[test]
    fn load_reads_settings_from_explicit_env_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        write_env_file(&path, "https://sso.example.com", "master", "admin-cli").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.base_url, "https://sso.example.com");
        assert_eq!(settings.login_realm, "master");
        assert_eq!(settings.client_id, "admin-cli");
    }

    #[test]
    fn load_fails_on_missing_explicit_env_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.env");
        let err = Settings::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, KeyforgeError::Configuration(_)));
    }

    #[test]
    fn default_env_path_ends_with_env_file() {
        let path = default_env_path();
        assert!(path.ends_with("keyforge/.env") || path.ends_with(".keyforge/.env"));
    }
}
