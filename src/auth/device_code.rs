use chrono::{DateTime, Utc};

use super::token::TokenSet;

/// Device-authorization session details returned by the device endpoint.
#[derive(Debug, Clone)]
pub struct DeviceCodeSession {
    pub verification_url: String,
    pub user_code: String,
    pub device_code: String,
    pub interval_secs: u64,
    pub expires_at: DateTime<Utc>,
}

impl DeviceCodeSession {
    /// Direct link the operator opens to approve the device.
    pub fn operator_url(&self) -> String {
        format!("{}?user_code={}", self.verification_url, self.user_code)
    }
}

/// Outcome of a single poll of the token endpoint.
#[derive(Debug, Clone)]
pub enum DeviceCodePoll {
    /// Authorization still pending; keep polling.
    Pending { interval_secs: u64 },
    /// Server asked to slow down; poll again after the longer interval.
    SlowDown { interval_secs: u64 },
    /// Operator approved; token is ready.
    Authorized { token: TokenSet },
    /// The device code expired before the operator approved.
    Expired,
}
