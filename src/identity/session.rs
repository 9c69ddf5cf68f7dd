//! Ephemeral sessions, derived from an identity at sign-in time.
//!
//! Sessions are not persisted anywhere: the table lives inside the
//! `SessionManager` handed to the server state, disappears on restart, and a
//! session dies at sign-out or expiry. Expiry is lazy — an expired entry is
//! dropped on the validate that finds it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use parking_lot::RwLock;
use tracing::info;

use super::claims::SessionClaims;

pub type SessionToken = String;

#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub token: SessionToken,
    pub claims: SessionClaims,
    pub issued_at: Instant,
    pub expires_at: Instant,
}

fn gen_id() -> String {
    // 256-bit random token, base64url without padding
    let mut buf = [0u8; 32];
    let _ = getrandom::getrandom(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

#[derive(Clone)]
pub struct SessionManager {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(60 * 60))
    }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn issue(&self, claims: SessionClaims) -> Session {
        let now = Instant::now();
        let sess = Session {
            session_id: gen_id(),
            token: gen_id(),
            claims,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        info!(target: "session", sid = %sess.session_id, id = %sess.claims.identity_id, ttl_secs = self.ttl.as_secs(), "session.issue");
        self.sessions.write().insert(sess.token.clone(), sess.clone());
        sess
    }

    /// Claims for a live token, or None for unknown/expired tokens.
    pub fn validate(&self, token: &str) -> Option<SessionClaims> {
        let now = Instant::now();
        let mut drop_key: Option<String> = None;
        let out = {
            let map = self.sessions.read();
            match map.get(token) {
                Some(sess) if sess.expires_at > now => Some(sess.claims.clone()),
                Some(_) => {
                    drop_key = Some(token.to_string());
                    None
                }
                None => None,
            }
        };
        if let Some(k) = drop_key {
            self.sessions.write().remove(&k);
        }
        out
    }

    pub fn logout(&self, token: &str) -> bool {
        match self.sessions.write().remove(token) {
            Some(sess) => {
                info!(target: "session", sid = %sess.session_id, "session.logout");
                true
            }
            None => false,
        }
    }
}
