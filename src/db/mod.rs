//! Database layer (Firestore, or in-memory for tests and local runs).

pub mod document;
pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TEAMS: &str = "teams";
    pub const ACTIVITIES: &str = "activities";
    pub const LEADERBOARD: &str = "leaderboard";
    pub const WORKOUTS: &str = "workouts";

    /// Every application collection, in population order.
    pub const ALL: [&str; 5] = [USERS, TEAMS, ACTIVITIES, LEADERBOARD, WORKOUTS];

    /// Unique field registrations (Firestore only, keyed by collection)
    pub const UNIQUE_INDEXES: &str = "_unique_indexes";
    /// Active generation per swapped collection (Firestore only)
    pub const POINTERS: &str = "_collection_pointers";
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreDb),
    Memory(MemoryStore),
}

/// Storage handle shared by the API and the population command.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

impl Database {
    /// Connect to the backend selected in the configuration.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.storage_backend {
            StorageBackend::Firestore => Ok(Self::firestore(
                FirestoreDb::new(&config.gcp_project_id).await?,
            )),
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on exit");
                Ok(Self::memory())
            }
        }
    }

    pub fn firestore(db: FirestoreDb) -> Self {
        Self {
            backend: Backend::Firestore(db),
        }
    }

    /// Fresh, empty in-memory store.
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::new()),
        }
    }

    /// Disconnected store: every operation fails with `StorageUnavailable`.
    pub fn offline() -> Self {
        Self::firestore(FirestoreDb::new_mock())
    }

    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Firestore(_) => "firestore",
            Backend::Memory(_) => "memory",
        }
    }

    /// Get all documents in a collection.
    pub async fn list<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.list(collection).await,
            Backend::Memory(db) => db.list(collection).await,
        }
    }

    /// Get one document by ID.
    pub async fn get<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.get(collection, id).await,
            Backend::Memory(db) => db.get(collection, id).await,
        }
    }

    /// Get documents whose string `field` equals `value`.
    pub async fn find_by<T>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.find_by(collection, field, value).await,
            Backend::Memory(db) => db.find_by(collection, field, value).await,
        }
    }

    /// Insert records; returns their IDs in input order.
    pub async fn insert_many<T>(&self, collection: &str, records: &[T]) -> Result<Vec<String>, AppError>
    where
        T: Serialize + Sync + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.insert_many(collection, records).await,
            Backend::Memory(db) => db.insert_many(collection, records).await,
        }
    }

    /// Delete every document in a collection; returns the number removed.
    pub async fn delete_all(&self, collection: &str) -> Result<usize, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.delete_all(collection).await,
            Backend::Memory(db) => db.delete_all(collection).await,
        }
    }

    pub async fn create_unique_index(&self, collection: &str, field: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.create_unique_index(collection, field).await,
            Backend::Memory(db) => db.create_unique_index(collection, field).await,
        }
    }

    pub async fn count(&self, collection: &str) -> Result<usize, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.count(collection).await,
            Backend::Memory(db) => db.count(collection).await,
        }
    }

    /// Delete-all plus insert, observed atomically by readers.
    pub async fn replace_all<T>(&self, collection: &str, records: &[T]) -> Result<Vec<String>, AppError>
    where
        T: Serialize + Sync + Send,
    {
        match &self.backend {
            Backend::Firestore(db) => db.replace_all(collection, records).await,
            Backend::Memory(db) => db.replace_all(collection, records).await,
        }
    }
}
