//! Session claims: the identity attributes attached to a session at sign-in
//! and re-checked on every session read.

use serde::{Deserialize, Serialize};

use super::model::IdentityView;
use super::store::SharedStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub identity_id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl SessionClaims {
    /// Token-issuance path: the identity is in hand exactly once, at sign-in,
    /// so its id is copied onto the claims here.
    pub fn for_identity(view: &IdentityView) -> Self {
        Self {
            identity_id: view.id.clone(),
            email: view.email.clone(),
            display_name: view.display_name.clone(),
            avatar_url: view.avatar_url.clone(),
        }
    }

    /// Session-read path: recover the id from the store by the carried email.
    /// When the store has no matching identity (it was reset since sign-in),
    /// the claims pass through unchanged rather than failing the request.
    pub fn enriched(self, store: &SharedStore) -> Self {
        match store.find_by_email(&self.email) {
            Some(identity) => Self { identity_id: identity.id, ..self },
            None => self,
        }
    }
}
