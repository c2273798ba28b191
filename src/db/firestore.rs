// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with generic collection operations.
//!
//! Firestore has no unique indexes and no atomic "truncate", so both are
//! layered on top:
//! - Unique fields are registered in `_unique_indexes` and enforced by using
//!   the encoded field value as the document ID with create-only writes.
//! - `replace_all` writes into a fresh generation collection, then switches
//!   the pointer in `_collection_pointers` inside a transaction. All reads
//!   resolve the pointer first, so readers see the old or the new snapshot.

use crate::db::collections;
use crate::db::document::{
    batch_unique_keys, keyed_document_id, new_document_id, to_document, unique_key,
};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use firestore::FirestoreConsistencySelector;
use futures_util::{stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Document ID only; used for counting and deleting.
#[derive(Debug, Deserialize)]
struct DocumentId {
    #[serde(alias = "_firestore_id")]
    id: String,
}

/// Registered unique field for a collection.
#[derive(Debug, Serialize, Deserialize)]
struct UniqueIndex {
    field: String,
}

/// Generation currently served for a logical collection.
///
/// The generation it replaced is kept until the next publish, so a reader
/// that resolved the old pointer can still finish its query.
#[derive(Debug, Serialize, Deserialize)]
struct CollectionPointer {
    active: String,
    #[serde(default)]
    previous: Option<String>,
    published_at: DateTime<Utc>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    /// Registered unique field per collection.
    unique_fields: Arc<DashMap<String, String>>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self::with_client(Some(client)))
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self::with_client(Some(client)))
    }

    /// Create an offline client for testing.
    ///
    /// All database operations return `StorageUnavailable`.
    pub fn new_mock() -> Self {
        Self::with_client(None)
    }

    fn with_client(client: Option<firestore::FirestoreDb>) -> Self {
        Self {
            client,
            unique_fields: Arc::new(DashMap::new()),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::StorageUnavailable("Database not connected (offline mode)".to_string())
        })
    }

    // ─── Metadata ────────────────────────────────────────────────

    /// Resolve the physical collection currently serving a logical one.
    async fn active_collection(&self, collection: &str) -> Result<String, AppError> {
        let pointer: Option<CollectionPointer> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::POINTERS)
            .obj()
            .one(collection)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(pointer.map_or_else(|| collection.to_string(), |p| p.active))
    }

    /// Look up the unique field registered for a collection.
    ///
    /// Only registered fields are cached: an index may be created later by
    /// another process, so "no index" is re-read on every call.
    async fn unique_field(&self, collection: &str) -> Result<Option<String>, AppError> {
        if let Some(cached) = self.unique_fields.get(collection) {
            return Ok(Some(cached.value().clone()));
        }

        let index: Option<UniqueIndex> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::UNIQUE_INDEXES)
            .obj()
            .one(collection)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let field = index.map(|i| i.field);
        if let Some(field) = &field {
            self.unique_fields
                .insert(collection.to_string(), field.clone());
        }
        Ok(field)
    }

    /// List the document IDs of a physical collection.
    async fn document_ids(&self, physical: &str) -> Result<Vec<String>, AppError> {
        let docs: Vec<DocumentId> = self
            .get_client()?
            .fluent()
            .select()
            .from(physical)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs.into_iter().map(|d| d.id).collect())
    }

    /// Assign document IDs: keyed by the unique field if there is one.
    async fn assign_ids(
        &self,
        collection: &str,
        documents: &[Map<String, Value>],
    ) -> Result<(Option<String>, Vec<String>), AppError> {
        match self.unique_field(collection).await? {
            Some(field) => {
                let keys = batch_unique_keys(documents, collection, &field)?;
                let ids = keys.iter().map(|k| keyed_document_id(k)).collect();
                Ok((Some(field), ids))
            }
            None => {
                let ids = documents
                    .iter()
                    .map(|_| new_document_id())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((None, ids))
            }
        }
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Get all documents in a collection.
    pub async fn list<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let physical = self.active_collection(collection).await?;
        self.get_client()?
            .fluent()
            .select()
            .from(physical.as_str())
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get one document by ID.
    pub async fn get<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let physical = self.active_collection(collection).await?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(physical.as_str())
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get documents whose string field equals `value`.
    pub async fn find_by<T>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let physical = self.active_collection(collection).await?;
        let field = field.to_string();
        let value = value.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(physical.as_str())
            .filter(move |q| q.field(field.as_str()).eq(value.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count documents in a collection.
    pub async fn count(&self, collection: &str) -> Result<usize, AppError> {
        let physical = self.active_collection(collection).await?;
        Ok(self.document_ids(&physical).await?.len())
    }

    // ─── Writes ──────────────────────────────────────────────────

    /// Register a unique field for a collection.
    pub async fn create_unique_index(&self, collection: &str, field: &str) -> Result<(), AppError> {
        let index = UniqueIndex {
            field: field.to_string(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::UNIQUE_INDEXES)
            .document_id(collection)
            .object(&index)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.unique_fields
            .insert(collection.to_string(), field.to_string());

        tracing::info!(collection, field, "Unique index registered");
        Ok(())
    }

    /// Insert records, returning their document IDs in input order.
    ///
    /// Collections with a unique field use create-only writes so an existing
    /// key fails with `DuplicateKey`. Other collections are written in
    /// transactional batches.
    pub async fn insert_many<T>(&self, collection: &str, records: &[T]) -> Result<Vec<String>, AppError>
    where
        T: Serialize + Sync + Send,
    {
        let documents = records
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;
        let physical = self.active_collection(collection).await?;
        let (unique, ids) = self.assign_ids(collection, &documents).await?;

        if let Some(field) = unique {
            self.create_keyed(&physical, &field, &documents, &ids)
                .await?;
        } else {
            self.write_batches(&physical, &documents, &ids).await?;
        }

        tracing::debug!(collection, count = ids.len(), "Inserted documents");
        Ok(ids)
    }

    /// Create-only writes, failing on an existing document ID.
    async fn create_keyed(
        &self,
        physical: &str,
        field: &str,
        documents: &[Map<String, Value>],
        ids: &[String],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(documents.iter().cloned().zip(ids.iter().cloned()))
            .map(|(document, doc_id)| async move {
                let _: () = client
                    .fluent()
                    .insert()
                    .into(physical)
                    .document_id(&doc_id)
                    .object(&document)
                    .execute()
                    .await
                    .map_err(|e| match e {
                        firestore::errors::FirestoreError::DataConflictError(_) => {
                            AppError::DuplicateKey(format!(
                                "{}.{} = {}",
                                physical,
                                field,
                                unique_key(&document, field).unwrap_or_default()
                            ))
                        }
                        other => AppError::Database(other.to_string()),
                    })?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    /// Write documents in transactions of at most `BATCH_SIZE` operations.
    async fn write_batches(
        &self,
        physical: &str,
        documents: &[Map<String, Value>],
        ids: &[String],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        for (doc_chunk, id_chunk) in documents.chunks(BATCH_SIZE).zip(ids.chunks(BATCH_SIZE)) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for (document, doc_id) in doc_chunk.iter().zip(id_chunk) {
                client
                    .fluent()
                    .update()
                    .in_col(physical)
                    .document_id(doc_id)
                    .object(document)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add write to transaction for {}: {}",
                            physical, e
                        ))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Failed to commit batch write: {}", e)))?;
        }

        Ok(())
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete(&self, physical: &str, ids: &[String]) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in ids.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for doc_id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(physical)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            physical, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    /// Delete every document in a collection. Returns the number deleted.
    pub async fn delete_all(&self, collection: &str) -> Result<usize, AppError> {
        let physical = self.active_collection(collection).await?;
        let ids = self.document_ids(&physical).await?;
        self.batch_delete(&physical, &ids).await?;

        tracing::debug!(collection, physical = %physical, count = ids.len(), "Deleted documents");
        Ok(ids.len())
    }

    /// Atomically replace the contents of a collection.
    ///
    /// 1. Write all records into a new generation collection.
    /// 2. In one transaction, read the pointer and switch it to the new
    ///    generation, keeping the generation it replaced as `previous`.
    /// 3. Delete the generation that was `previous` before the switch.
    ///
    /// Concurrent publishers conflict on the pointer document, so each
    /// retired generation is deleted by exactly one of them.
    pub async fn replace_all<T>(&self, collection: &str, records: &[T]) -> Result<Vec<String>, AppError>
    where
        T: Serialize + Sync + Send,
    {
        let documents = records
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;
        let (_, ids) = self.assign_ids(collection, &documents).await?;

        let generation = format!("{}__{}", collection, new_document_id()?);

        if let Err(e) = self.write_batches(&generation, &documents, &ids).await {
            self.discard_generation(&generation).await;
            return Err(e);
        }

        let retired = match self.switch_pointer(collection, &generation).await {
            Ok(retired) => retired,
            Err(e) => {
                self.discard_generation(&generation).await;
                return Err(e);
            }
        };

        tracing::info!(
            collection,
            generation = %generation,
            count = ids.len(),
            "Published collection snapshot"
        );

        // Nobody can resolve to the retired generation any more.
        if let Some(retired) = retired {
            match self.document_ids(&retired).await {
                Ok(old_ids) => {
                    if let Err(e) = self.batch_delete(&retired, &old_ids).await {
                        tracing::warn!(error = %e, retired = %retired, "Failed to delete retired generation");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, retired = %retired, "Failed to list retired generation");
                }
            }
        }

        Ok(ids)
    }

    /// Point `collection` at `generation`. Returns the generation that is no
    /// longer referenced by the pointer, if any.
    async fn switch_pointer(
        &self,
        collection: &str,
        generation: &str,
    ) -> Result<Option<String>, AppError> {
        let client = self.get_client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read through the transaction so a concurrent switch aborts the commit.
        let current: Option<CollectionPointer> = client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
            .fluent()
            .select()
            .by_id_in(collections::POINTERS)
            .obj()
            .one(collection)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read pointer in transaction: {}", e))
            })?;

        let (active, retired) = match current {
            Some(pointer) => (pointer.active, pointer.previous),
            None => (collection.to_string(), None),
        };

        let pointer = CollectionPointer {
            active: generation.to_string(),
            previous: Some(active),
            published_at: Utc::now(),
        };

        client
            .fluent()
            .update()
            .in_col(collections::POINTERS)
            .document_id(collection)
            .object(&pointer)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add pointer to transaction: {}", e))
            })?;

        transaction.commit().await.map_err(|e| {
            AppError::Database(format!("Failed to publish {}: {}", collection, e))
        })?;

        Ok(retired)
    }

    /// Best-effort cleanup of an unpublished generation.
    async fn discard_generation(&self, generation: &str) {
        let result = match self.document_ids(generation).await {
            Ok(ids) => self.batch_delete(generation, &ids).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, generation, "Failed to discard staging generation");
        }
    }
}
