use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Clock-skew allowance when judging whether a token looks expired.
const EXPIRY_SKEW_SECS: i64 = 10;

/// OAuth token payload held by a session and persisted to the credential
/// cache.
///
/// `issued_at` is stamped locally at the moment the token response is
/// received and is serialized as `timestamp` in the cache record; the
/// server's own notion of issue time is never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(rename = "timestamp")]
    pub issued_at: i64,
}

impl TokenSet {
    /// Whether the access token is past its lifetime.
    ///
    /// Informational only: an expired token is still presented until a
    /// request comes back 401.
    pub fn looks_expired(&self) -> bool {
        Utc::now().timestamp() >= self.issued_at + self.expires_in as i64 - EXPIRY_SKEW_SECS
    }
}
