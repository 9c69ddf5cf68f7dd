//! Registration service: create a new password-origin identity.

use thiserror::Error;
use tracing::info;

use crate::security;

use super::model::{Identity, IdentityView};
use super::store::{InsertError, SharedStore};

/// Minimum accepted password length, mirrored by the sign-up form.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("{0}")]
    Validation(String),
    #[error("this email address is already registered")]
    Duplicate,
    #[error("password hashing failed: {0}")]
    Hashing(#[from] anyhow::Error),
}

pub struct RegistrationService {
    store: SharedStore,
}

impl RegistrationService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Validate, hash, and insert. Returns the public view of the new
    /// identity; the password hash stays inside the store. No session is
    /// created here — the caller signs in separately, as the storefront does.
    pub fn register(&self, req: &Registration) -> Result<IdentityView, RegisterError> {
        if req.email.is_empty() || req.password.is_empty() || req.display_name.is_empty() {
            return Err(RegisterError::Validation(
                "email, password and name are required".into(),
            ));
        }
        // Counted in characters, as the sign-up form does, so multibyte
        // passwords are measured the same on both sides.
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegisterError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let phc = security::hash_password(&req.password)?;
        let identity = Identity::password(req.email.clone(), req.display_name.clone(), phc);
        let inserted = self.store.insert_if_absent(identity).map_err(|e| match e {
            InsertError::Duplicate => RegisterError::Duplicate,
        })?;
        info!(target: "auth", email = %inserted.email, id = %inserted.id, "register.created");
        Ok(inserted.view())
    }
}
