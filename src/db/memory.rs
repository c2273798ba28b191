// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Used for tests and for running the API without GCP. Documents are kept
//! as JSON objects; all writes to a collection happen under one lock, so a
//! `replace_all` is observed atomically by readers.

use crate::db::document::{
    batch_unique_keys, keyed_document_id, new_document_id, to_document, unique_key,
};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

type Document = Map<String, Value>;

#[derive(Default)]
struct MemoryState {
    /// Documents per collection, in insertion order.
    collections: HashMap<String, Vec<(String, Document)>>,
    /// Unique field per collection.
    unique_fields: HashMap<String, String>,
}

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, AppError> {
        let state = self.state.read().await;
        state
            .collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, doc)| decode(id, doc)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, AppError> {
        let state = self.state.read().await;
        state
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(doc_id, doc)| decode(doc_id, doc))
            .transpose()
    }

    pub async fn find_by<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AppError> {
        let state = self.state.read().await;
        let Some(docs) = state.collections.get(collection) else {
            return Ok(Vec::new());
        };

        docs.iter()
            .filter(|(_, doc)| doc.get(field).and_then(Value::as_str) == Some(value))
            .map(|(id, doc)| decode(id, doc))
            .collect()
    }

    pub async fn insert_many<T: Serialize>(
        &self,
        collection: &str,
        records: &[T],
    ) -> Result<Vec<String>, AppError> {
        let documents = records
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = self.state.write().await;

        let mut keys = None;
        if let Some(field) = state.unique_fields.get(collection).cloned() {
            let batch_keys = batch_unique_keys(&documents, collection, &field)?;
            let existing: HashSet<String> = state
                .collections
                .get(collection)
                .into_iter()
                .flatten()
                .filter_map(|(_, doc)| unique_key(doc, &field).ok())
                .collect();

            if let Some(key) = batch_keys.iter().find(|k| existing.contains(*k)) {
                return Err(AppError::DuplicateKey(format!(
                    "{}.{} = {}",
                    collection, field, key
                )));
            }
            keys = Some(batch_keys);
        }

        // Keyed IDs match the Firestore backend.
        let ids: Vec<String> = match keys {
            Some(keys) => keys.iter().map(|k| keyed_document_id(k)).collect(),
            None => documents
                .iter()
                .map(|_| new_document_id())
                .collect::<Result<Vec<_>, _>>()?,
        };
        let stamped: Vec<(String, Document)> = ids.iter().cloned().zip(documents).collect();

        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .extend(stamped);

        Ok(ids)
    }

    pub async fn delete_all(&self, collection: &str) -> Result<usize, AppError> {
        let mut state = self.state.write().await;
        Ok(state
            .collections
            .remove(collection)
            .map(|docs| docs.len())
            .unwrap_or(0))
    }

    pub async fn create_unique_index(&self, collection: &str, field: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;

        // Existing documents must already satisfy the constraint.
        if let Some(docs) = state.collections.get(collection) {
            let documents: Vec<Document> = docs.iter().map(|(_, doc)| doc.clone()).collect();
            batch_unique_keys(&documents, collection, field)?;
        }

        state
            .unique_fields
            .insert(collection.to_string(), field.to_string());
        Ok(())
    }

    pub async fn count(&self, collection: &str) -> Result<usize, AppError> {
        let state = self.state.read().await;
        Ok(state.collections.get(collection).map_or(0, Vec::len))
    }

    /// Replace the whole collection in one write-lock critical section.
    pub async fn replace_all<T: Serialize>(
        &self,
        collection: &str,
        records: &[T],
    ) -> Result<Vec<String>, AppError> {
        let documents = records
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;

        let mut ids = Vec::with_capacity(documents.len());
        let mut snapshot = Vec::with_capacity(documents.len());
        for document in documents {
            let id = new_document_id()?;
            ids.push(id.clone());
            snapshot.push((id, document));
        }

        let mut state = self.state.write().await;
        if let Some(field) = state.unique_fields.get(collection) {
            let docs: Vec<Document> = snapshot.iter().map(|(_, doc)| doc.clone()).collect();
            batch_unique_keys(&docs, collection, field)?;
        }
        state.collections.insert(collection.to_string(), snapshot);

        Ok(ids)
    }
}

fn decode<T: DeserializeOwned>(id: &str, document: &Document) -> Result<T, AppError> {
    let mut object = document.clone();
    object.insert("id".to_string(), Value::String(id.to_string()));
    serde_json::from_value(Value::Object(object))
        .map_err(|e| AppError::Database(format!("Failed to decode document {}: {}", id, e)))
}
