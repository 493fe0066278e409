//! Authenticated-session management: device-code login, credential caching,
//! token refresh, and the authenticated-request wrapper.

pub mod cache;
pub mod device_code;
pub mod session;
pub mod token;

pub use cache::{CredentialCache, EndpointIdentity};
pub use device_code::{DeviceCodePoll, DeviceCodeSession};
pub use session::AuthSession;
pub use token::TokenSet;
