//! Authentication provider adapter: resolves either credential presentation
//! (password or federated assertion) into a verified identity view.
//!
//! A failed attempt is a normal outcome, not an error, so the result is a
//! tagged `AuthOutcome` rather than a `Result`. The two presentation methods
//! are dispatched explicitly through `SignIn` instead of a framework-side
//! provider registry.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::security;

use super::model::{Identity, IdentityView, Origin};
use super::store::{InsertError, SharedStore};

/// Result of one sign-in attempt. `Rejected` covers both unknown email and
/// wrong password; the two are deliberately indistinguishable in shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Resolved(IdentityView),
    Rejected,
}

impl AuthOutcome {
    pub fn resolved(self) -> Option<IdentityView> {
        match self {
            AuthOutcome::Resolved(v) => Some(v),
            AuthOutcome::Rejected => None,
        }
    }
}

/// Identity assertion already verified by the external provider. Trust
/// boundary: once the provider handshake succeeded these fields are taken as
/// authentic; no further verification happens here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedAssertion {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One sign-in request, tagged by presentation method.
#[derive(Debug, Clone)]
pub enum SignIn {
    Credentials { email: String, password: String },
    Federated(FederatedAssertion),
}

pub struct AuthAdapter {
    store: SharedStore,
}

impl AuthAdapter {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn resolve(&self, req: SignIn) -> Result<AuthOutcome> {
        match req {
            SignIn::Credentials { email, password } => Ok(self.authorize(&email, &password)),
            SignIn::Federated(assertion) => self.federated_sign_in(&assertion),
        }
    }

    /// Password path. All-or-nothing: either the stored hash verifies against
    /// the supplied password or the attempt is rejected. An unknown email
    /// still burns one verification so timing does not leak which accounts
    /// exist.
    pub fn authorize(&self, email: &str, password: &str) -> AuthOutcome {
        let candidate = self
            .store
            .find_by_email(email)
            .filter(|identity| identity.origin == Origin::Password);
        let Some(identity) = candidate else {
            security::burn_verification(password);
            return AuthOutcome::Rejected;
        };
        match identity.password_hash() {
            Some(phc) if security::verify_password(phc, password) => {
                let view = identity.view();
                info!(target: "auth", id = %view.id, "signin.credentials");
                AuthOutcome::Resolved(view)
            }
            _ => AuthOutcome::Rejected,
        }
    }

    /// Federated path: lazy upsert keyed on the asserted email. Idempotent —
    /// a second assertion for the same email resolves the existing record
    /// without mutation. An assertion matching a password-origin identity
    /// attaches to it; that merge is logged because the account holder never
    /// proved the password to this provider.
    pub fn federated_sign_in(&self, assertion: &FederatedAssertion) -> Result<AuthOutcome> {
        if let Some(existing) = self.store.find_by_email(&assertion.email) {
            if existing.origin == Origin::Password {
                warn!(target: "auth", id = %existing.id, "signin.federated attached to password-origin identity");
            }
            info!(target: "auth", id = %existing.id, "signin.federated");
            return Ok(AuthOutcome::Resolved(existing.view()));
        }
        let fresh = Identity::federated(
            assertion.id.clone(),
            assertion.email.clone(),
            assertion.name.clone().unwrap_or_else(|| "Unknown User".into()),
            assertion.avatar_url.clone(),
        );
        let inserted = match self.store.insert_if_absent(fresh) {
            Ok(identity) => identity,
            // Lost a race with a concurrent first sign-in; the winner's record
            // is the identity to resolve.
            Err(InsertError::Duplicate) => self
                .store
                .find_by_email(&assertion.email)
                .ok_or_else(|| anyhow::anyhow!("identity vanished after duplicate insert"))?,
        };
        info!(target: "auth", id = %inserted.id, "signin.federated created");
        Ok(AuthOutcome::Resolved(inserted.view()))
    }
}
