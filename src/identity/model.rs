//! Identity records and the public view handed to sessions and API callers.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Creation-time-derived id with a random tail: the millisecond prefix keeps
// the original's scheme readable, the tail keeps ids unique when parallel
// sign-ups land in the same millisecond.
fn creation_id(prefix: &str, created_at: &DateTime<Utc>) -> String {
    let mut buf = [0u8; 4];
    let _ = getrandom::getrandom(&mut buf);
    let tail = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf);
    format!("{}_{}_{}", prefix, created_at.timestamp_millis(), tail)
}

/// Which credential presentation created the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Password,
    Federated,
}

/// One registered user. Exactly one identity exists per email address,
/// regardless of origin; `password_hash` is carried if and only if the
/// origin is `Password`. Both constructors below uphold that pairing, and
/// records are never mutated after insertion (no profile edit, no reset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub origin: Origin,
    password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Password-origin identity. `password_hash` must already be a PHC string;
    /// hashing is the registration service's job.
    pub fn password(email: String, display_name: String, password_hash: String) -> Self {
        let created_at = Utc::now();
        Self {
            id: creation_id("cred", &created_at),
            email,
            display_name,
            avatar_url: None,
            origin: Origin::Password,
            password_hash: Some(password_hash),
            created_at,
        }
    }

    /// Federated-origin identity, created lazily on first provider sign-in.
    /// The asserted id is kept when the provider supplies one.
    pub fn federated(asserted_id: Option<String>, email: String, display_name: String, avatar_url: Option<String>) -> Self {
        let created_at = Utc::now();
        let id = asserted_id.unwrap_or_else(|| creation_id("fed", &created_at));
        Self {
            id,
            email,
            display_name,
            avatar_url,
            origin: Origin::Federated,
            password_hash: None,
            created_at,
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn view(&self) -> IdentityView {
        IdentityView {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Minimal identity view: what sessions and API responses carry. Never
/// includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityView {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
