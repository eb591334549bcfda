pub mod clickhouse;
pub mod memory;

use std::sync::Arc;

use user_service_config::storage::StorageConfig;

use crate::messages::User;

pub use crate::storage::{clickhouse::ClickHouseUserStore, memory::InMemoryUserStore};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to reach the storage backend: {0}")]
    Connection(String),
    #[error("storage backend responded with {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("failed to decode a storage row: {0}")]
    Decode(String),
    #[error("failed to create the storage client: {0}")]
    ClientCreation(String),
    #[error("storage worker failed: {0}")]
    Worker(String),
}

/// Blocking access to user records. Callers run it off the async workers,
/// see [`run_blocking`].
pub trait UserStore: Send + Sync + 'static {
    fn find_user(&self, id: i64) -> Result<Option<User>, StorageError>;

    /// Users ordered by id.
    fn list_users(&self, limit: u64, offset: u64) -> Result<Vec<User>, StorageError>;

    fn count_users(&self) -> Result<u64, StorageError>;

    fn insert_user(&self, username: &str, email: &str) -> Result<(), StorageError>;
}

pub type SharedUserStore = Arc<dyn UserStore>;

/// Runs a store operation on the blocking pool and waits for it.
pub async fn run_blocking<T, F>(store: &SharedUserStore, operation: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce(&dyn UserStore) -> Result<T, StorageError> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || operation(store.as_ref()))
        .await
        .map_err(|err| StorageError::Worker(err.to_string()))?
}

pub async fn store_from_config(config: &StorageConfig) -> Result<SharedUserStore, StorageError> {
    match config {
        StorageConfig::Memory(memory) => Ok(Arc::new(InMemoryUserStore::with_seed(
            memory.seed.iter().map(|seed| User {
                id: seed.id,
                username: seed.username.clone(),
                email: seed.email.clone(),
            }),
        ))),
        StorageConfig::ClickHouse(clickhouse) => {
            let clickhouse = clickhouse.clone();
            // the blocking HTTP client must not be created on an async worker
            let store = tokio::task::spawn_blocking(move || ClickHouseUserStore::new(&clickhouse))
                .await
                .map_err(|err| StorageError::Worker(err.to_string()))??;

            Ok(Arc::new(store))
        }
    }
}
