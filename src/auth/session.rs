//! Authenticated session: device-code login, token refresh, and the
//! bearer-request wrapper with one-shot retry on credential expiry.

use chrono::{Duration, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::cache::{CredentialCache, EndpointIdentity};
use super::device_code::{DeviceCodePoll, DeviceCodeSession};
use super::token::TokenSet;
use crate::error::{KeyforgeError, Result};

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Session holding the bearer credential for one endpoint identity.
///
/// Expiry is detected lazily: a cached token is presented as-is until a
/// request comes back 401, at which point the session refreshes once and
/// retries that request once. This is the documented contract, not an
/// oversight; the session never refuses a token pre-emptively.
pub struct AuthSession {
    client: reqwest::Client,
    base_url: String,
    realm: String,
    client_id: String,
    cache: CredentialCache,
    token_set: Option<TokenSet>,
}

impl AuthSession {
    /// Create a session for one endpoint identity, loading any cached
    /// credential for it.
    ///
    /// A cache hit moves the session straight to authenticated regardless
    /// of apparent expiry.
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        cache: CredentialCache,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let realm = realm.into();
        let client_id = client_id.into();

        let identity = EndpointIdentity {
            realm: realm.clone(),
            client_id: client_id.clone(),
        };
        let token_set = cache.load(&identity);
        match &token_set {
            Some(token) if token.looks_expired() => {
                tracing::info!("Cached token past its lifetime; will refresh on first rejected request");
            }
            Some(_) => tracing::info!("Loaded cached access token"),
            None => {}
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            realm,
            client_id,
            cache,
            token_set,
        }
    }

    /// Base URL this session was configured with (trailing slash stripped).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The currently held token set, if any.
    pub fn token_set(&self) -> Option<&TokenSet> {
        self.token_set.as_ref()
    }

    /// Obtain an access token via the device-authorization grant.
    ///
    /// No-op when a token set is already held (cached or previously
    /// acquired). Otherwise starts a device session, logs the verification
    /// URL for the operator, and polls until the server issues a token, the
    /// device code expires, or the exchange fails outright. There is no
    /// retry across device sessions.
    pub async fn authenticate(&mut self) -> Result<()> {
        if self.token_set.is_some() {
            return Ok(());
        }

        let session = self.start_device_code().await?;
        tracing::info!(url = %session.operator_url(), "Open the following URL to authenticate");

        let mut interval = session.interval_secs;
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
            match self.poll_device_code(&session).await? {
                DeviceCodePoll::Authorized { token } => {
                    self.install_token(token);
                    tracing::info!("Authentication successful");
                    return Ok(());
                }
                DeviceCodePoll::Pending { interval_secs }
                | DeviceCodePoll::SlowDown { interval_secs } => {
                    interval = interval_secs;
                }
                DeviceCodePoll::Expired => {
                    return Err(KeyforgeError::AuthenticationFailed(
                        "device code expired before authorization".to_string(),
                    ));
                }
            }
        }
    }

    /// Request a device code and operator verification URL.
    pub async fn start_device_code(&self) -> Result<DeviceCodeSession> {
        let resp = self
            .client
            .post(self.device_url())
            .form(&[("client_id", self.client_id.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(KeyforgeError::AuthenticationFailed(format!(
                "device code request failed with status {status}: {body}"
            )));
        }
        let payload: DeviceCodeResponse = resp.json().await?;
        Ok(DeviceCodeSession {
            verification_url: payload.verification_uri,
            user_code: payload.user_code,
            device_code: payload.device_code,
            interval_secs: payload.interval,
            expires_at: Utc::now() + Duration::seconds(payload.expires_in as i64),
        })
    }

    /// Poll the token endpoint once for the outcome of a device session.
    ///
    /// 200 yields the stamped token set; 400 and 428 mean the authorization
    /// is still pending (428 asks for a longer interval); any other status
    /// is fatal for the device session.
    pub async fn poll_device_code(&self, session: &DeviceCodeSession) -> Result<DeviceCodePoll> {
        if Utc::now() >= session.expires_at {
            return Ok(DeviceCodePoll::Expired);
        }
        let resp = self
            .client
            .post(self.token_url())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("grant_type", DEVICE_CODE_GRANT),
                ("device_code", session.device_code.as_str()),
            ])
            .send()
            .await?;
        match resp.status() {
            StatusCode::OK => {
                let payload: TokenResponse = resp.json().await?;
                Ok(DeviceCodePoll::Authorized {
                    token: payload.into_token_set(),
                })
            }
            StatusCode::BAD_REQUEST => Ok(DeviceCodePoll::Pending {
                interval_secs: session.interval_secs,
            }),
            StatusCode::PRECONDITION_REQUIRED => Ok(DeviceCodePoll::SlowDown {
                interval_secs: session.interval_secs + 2,
            }),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(KeyforgeError::AuthenticationFailed(format!(
                    "token exchange failed with status {status}: {body}"
                )))
            }
        }
    }

    /// Exchange the held refresh token for a new token set.
    ///
    /// On failure the session drops its credential entirely; the caller
    /// must authenticate from scratch.
    pub async fn refresh(&mut self) -> Result<()> {
        let refresh_token = match &self.token_set {
            Some(token) => token.refresh_token.clone(),
            None => return Err(KeyforgeError::NotAuthenticated),
        };
        match self.exchange_refresh_token(&refresh_token).await {
            Ok(token) => {
                self.install_token(token);
                tracing::info!("Token refreshed");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Token refresh failed");
                self.token_set = None;
                Err(err)
            }
        }
    }

    /// Issue an authenticated request.
    ///
    /// Attaches the bearer header and sends the call. On 401 the session
    /// refreshes exactly once and retries the call exactly once; the retried
    /// response is returned as-is, including a second 401. Transport errors
    /// are logged and re-raised with no local retry.
    pub async fn send(&mut self, method: Method, url: &str, body: Option<&Value>) -> Result<Response> {
        if self.token_set.is_none() {
            return Err(KeyforgeError::NotAuthenticated);
        }
        let resp = self.issue(method.clone(), url, body).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }
        tracing::warn!(url, "Access token rejected; refreshing");
        self.refresh().await?;
        self.issue(method, url, body).await
    }

    async fn issue(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Response> {
        let token = self.token_set.as_ref().ok_or(KeyforgeError::NotAuthenticated)?;
        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", token.access_token))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|err| {
            tracing::error!(url, error = %err, "Request failed");
            KeyforgeError::from(err)
        })
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenSet> {
        let resp = self
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(KeyforgeError::RefreshFailed(format!(
                "refresh exchange failed with status {status}: {body}"
            )));
        }
        let payload: TokenResponse = resp.json().await?;
        Ok(payload.into_token_set())
    }

    fn install_token(&mut self, token: TokenSet) {
        if let Err(err) = self.cache.save(&self.identity(), &token) {
            tracing::warn!(error = %err, "Failed to cache token");
        }
        self.token_set = Some(token);
    }

    fn identity(&self) -> EndpointIdentity {
        EndpointIdentity {
            realm: self.realm.clone(),
            client_id: self.client_id.clone(),
        }
    }

    fn device_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/auth/device",
            self.base_url, self.realm
        )
    }

    fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url, self.realm
        )
    }
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_poll_interval")]
    interval: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    token_type: String,
    expires_in: u64,
}

impl TokenResponse {
    /// Stamp the response with the local receive time as `issued_at`.
    fn into_token_set(self) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            issued_at: Utc::now().timestamp(),
        }
    }
}
