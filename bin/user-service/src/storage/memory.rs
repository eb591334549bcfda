use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

use crate::messages::User;
use crate::storage::{StorageError, UserStore};

/// Process-local user records. Ids are assigned in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<i64, User>,
    last_id: AtomicI64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: impl IntoIterator<Item = User>) -> Self {
        let store = Self::new();
        for user in seed {
            store.last_id.fetch_max(user.id, Ordering::Relaxed);
            store.users.insert(user.id, user);
        }
        store
    }
}

impl UserStore for InMemoryUserStore {
    fn find_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    fn list_users(&self, limit: u64, offset: u64) -> Result<Vec<User>, StorageError> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by_key(|user| user.id);

        Ok(users
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    fn count_users(&self) -> Result<u64, StorageError> {
        Ok(self.users.len() as u64)
    }

    fn insert_user(&self, username: &str, email: &str) -> Result<(), StorageError> {
        let id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                email: email.to_string(),
            },
        );
        Ok(())
    }
}
