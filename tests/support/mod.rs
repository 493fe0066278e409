#![allow(dead_code)]

use chrono::Utc;
use keyforge::auth::{AuthSession, CredentialCache, EndpointIdentity, TokenSet};
use serde_json::json;
use tempfile::TempDir;

pub fn token(access: &str, refresh: &str) -> TokenSet {
    TokenSet {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 300,
        issued_at: Utc::now().timestamp(),
    }
}

pub fn identity(realm: &str, client_id: &str) -> EndpointIdentity {
    EndpointIdentity {
        realm: realm.to_string(),
        client_id: client_id.to_string(),
    }
}

/// A session pre-authenticated through a seeded cache in a temp dir.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn authenticated_session(
    base_url: &str,
    realm: &str,
    client_id: &str,
    access: &str,
) -> (TempDir, AuthSession) {
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("token.json");
    CredentialCache::new(cache_path.clone())
        .save(&identity(realm, client_id), &token(access, "refresh-1"))
        .unwrap();
    let session = AuthSession::new(base_url, realm, client_id, CredentialCache::new(cache_path));
    (dir, session)
}

/// Token endpoint response body for a successful exchange.
pub fn token_response_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "Bearer",
        "expires_in": 300
    })
}
