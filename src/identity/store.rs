//! Credential store: the registry of identities, addressable by email.
//!
//! The store is injected as a trait object so the registration service and
//! provider adapter never touch process-wide state directly, and tests can
//! swap in their own instance. Insertion is atomic-and-conditional: the
//! find-then-insert race of the original design is closed at the data layer
//! because this server handles requests in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use super::model::Identity;

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("an identity is already registered for this email")]
    Duplicate,
}

pub trait IdentityStore: Send + Sync {
    /// Exact, case-sensitive email lookup.
    fn find_by_email(&self, email: &str) -> Option<Identity>;

    /// Insert if no identity holds this email yet, else fail. The check and
    /// the write happen under one lock.
    fn insert_if_absent(&self, identity: Identity) -> Result<Identity, InsertError>;
}

/// Convenience alias used across services and server state.
pub type SharedStore = Arc<dyn IdentityStore>;

/// In-memory store. Volatile by design: every process start begins empty,
/// which is the replaceable seam for a durable keyed store later.
#[derive(Default)]
pub struct MemoryIdentityStore {
    by_email: RwLock<HashMap<String, Identity>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_email.read().len()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn find_by_email(&self, email: &str) -> Option<Identity> {
        self.by_email.read().get(email).cloned()
    }

    fn insert_if_absent(&self, identity: Identity) -> Result<Identity, InsertError> {
        let mut map = self.by_email.write();
        if map.contains_key(&identity.email) {
            return Err(InsertError::Duplicate);
        }
        debug!(target: "store", email = %identity.email, origin = ?identity.origin, "identity.insert");
        map.insert(identity.email.clone(), identity.clone());
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::model::Identity;

    #[test]
    fn lookup_is_case_sensitive() {
        let store = MemoryIdentityStore::new();
        store
            .insert_if_absent(Identity::password("Taro@b.com".into(), "Taro".into(), "$phc".into()))
            .expect("insert");
        assert!(store.find_by_email("Taro@b.com").is_some());
        assert!(store.find_by_email("taro@b.com").is_none());
    }

    #[test]
    fn second_insert_for_same_email_fails() {
        let store = MemoryIdentityStore::new();
        store
            .insert_if_absent(Identity::password("a@b.com".into(), "Taro".into(), "$phc".into()))
            .expect("first insert");
        let dup = store.insert_if_absent(Identity::federated(None, "a@b.com".into(), "Hana".into(), None));
        assert!(matches!(dup, Err(InsertError::Duplicate)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_inserts_admit_exactly_one() {
        let store = Arc::new(MemoryIdentityStore::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                store.insert_if_absent(Identity::password(
                    "race@b.com".into(),
                    format!("user{}", i),
                    "$phc".into(),
                ))
            }));
        }
        let wins = handles
            .into_iter()
            .map(|h| h.join().expect("join"))
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(wins, 1);
        assert_eq!(store.len(), 1);
    }
}
