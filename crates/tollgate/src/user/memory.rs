//! In-memory identity store.
//!
//! Used by tests and by embedders that manage identities outside a database.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::models::{NewUser, User};
use super::store::{IdentityStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    users: DashMap<String, User>,
    next_id: AtomicI64,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Flip the active flag of an existing user. Returns false if unknown.
    pub fn set_active(&self, username: &str, active: bool) -> bool {
        match self.users.get_mut(username) {
            Some(mut user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(username).map(|u| u.value().clone()))
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UsernameTaken(user.username)),
            Entry::Vacant(slot) => {
                let stored = User {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    username: user.username,
                    password_hash: user.password_hash,
                    firstname: user.firstname,
                    lastname: user.lastname,
                    country: user.country,
                    role: user.role,
                    is_active: true,
                    created_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                };
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Role;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            firstname: String::new(),
            lastname: String::new(),
            country: String::new(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryIdentityStore::new();
        let a = store.insert(new_user("a")).await.unwrap();
        let b = store.insert(new_user("b")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let store = MemoryIdentityStore::new();
        store.insert(new_user("a")).await.unwrap();
        assert!(matches!(
            store.insert(new_user("a")).await,
            Err(StoreError::UsernameTaken(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_set_active() {
        let store = MemoryIdentityStore::new();
        store.insert(new_user("a")).await.unwrap();
        assert!(store.set_active("a", false));
        assert!(!store.set_active("missing", false));

        let user = store.find_by_username("a").await.unwrap().unwrap();
        assert!(!user.is_active);
    }
}
