//! # keyforge
//!
//! Keycloak realm administration CLI.
//!
//! Authenticates an operator via the OAuth2 device-authorization grant,
//! persists and refreshes the resulting bearer credential, and uses it to
//! drive an idempotent reconciliation of client-role/group mappings in a
//! target realm from a CSV input.
//!
//! # Quick Start
//!
//! ```no_run
//! use keyforge::admin::AdminClient;
//! use keyforge::auth::{AuthSession, CredentialCache};
//! use keyforge::import::{ImportOrchestrator, ImportRow};
//!
//! # async fn example() -> keyforge::error::Result<()> {
//! let cache = CredentialCache::new(CredentialCache::default_path());
//! let mut session = AuthSession::new("https://sso.example.com", "master", "admin-cli", cache);
//! session.authenticate().await?;
//!
//! let admin = AdminClient::new(session, "my-realm");
//! let mut import = ImportOrchestrator::new(admin);
//! let rows = vec![ImportRow {
//!     role_name: "viewer".to_string(),
//!     group_name: "team-a".to_string(),
//! }];
//! let result = import.run("my-app", rows).await?;
//! println!("{} succeeded, {} failed", result.succeeded(), result.failed());
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;

pub use error::{KeyforgeError, Result};
