//! Process configuration read from environment variables at startup.
//!
//! All knobs have defaults so a bare `otogift-auth` starts and serves the
//! credentials path. The federated path needs provider credentials; when they
//! are absent the federated callback route is simply not mounted.

use std::time::Duration;

/// Client id/secret pair handed to us by the federated identity provider.
#[derive(Debug, Clone)]
pub struct FederatedProvider {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub session_ttl: Duration,
    /// None disables the federated sign-in path entirely.
    pub federated: Option<FederatedProvider>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8787,
            session_ttl: Duration::from_secs(60 * 60),
            federated: None,
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    /// Provider credentials are not validated here; a bad secret only shows up
    /// once the external handshake fails, which is the provider's business.
    pub fn from_env() -> Self {
        let http_port = std::env::var("OTOGIFT_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8787);
        let ttl_secs = std::env::var("OTOGIFT_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60 * 60);
        let federated = match (
            std::env::var("OTOGIFT_FEDERATED_CLIENT_ID").ok().filter(|s| !s.is_empty()),
            std::env::var("OTOGIFT_FEDERATED_CLIENT_SECRET").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(client_id), Some(client_secret)) => Some(FederatedProvider { client_id, client_secret }),
            _ => None,
        };
        Self { http_port, session_ttl: Duration::from_secs(ttl_secs), federated }
    }
}
