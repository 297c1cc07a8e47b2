use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tprintln;

/// Local record of a principal that has successfully authenticated at least
/// once. Authentication itself is always delegated to the external Resorter360
/// API, so no credential material is held here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

/// Process-owned identity store. Usernames are unique and case-sensitive;
/// records are created lazily on first successful login and never updated or
/// deleted afterwards.
#[derive(Debug, Default)]
pub struct IdentityStore {
    inner: RwLock<Maps>,
}

#[derive(Debug, Default)]
struct Maps {
    by_id: HashMap<String, Identity>,
    id_by_username: HashMap<String, String>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Identity> {
        self.inner.read().by_id.get(id).cloned()
    }

    pub fn get_by_username(&self, username: &str) -> Option<Identity> {
        let maps = self.inner.read();
        let id = maps.id_by_username.get(username)?;
        maps.by_id.get(id).cloned()
    }

    /// Look up the Identity for `username`, creating it if absent. The check
    /// and the insert happen under one write lock, so concurrent logins for
    /// the same username can never produce two Identities.
    pub fn get_or_create(&self, username: &str) -> Identity {
        let mut maps = self.inner.write();
        if let Some(id) = maps.id_by_username.get(username) {
            if let Some(existing) = maps.by_id.get(id) {
                return existing.clone();
            }
        }
        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
        };
        maps.id_by_username.insert(username.to_string(), identity.id.clone());
        maps.by_id.insert(identity.id.clone(), identity.clone());
        tprintln!("identity.create user={} id={}", identity.username, identity.id);
        identity
    }

    /// Seed the well-known back-office admin so the store is never empty on a
    /// fresh start. Insert-if-absent, same path as a first login.
    pub fn ensure_default_admin(&self) -> Identity {
        self.get_or_create("admin")
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
