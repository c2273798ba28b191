// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Helpers shared by the storage backends: document IDs, JSON conversion
//! and unique-key extraction.

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Length of a generated document ID in bytes (hex-encoded to 24 chars).
const DOCUMENT_ID_BYTES: usize = 12;

/// Generate a random document ID.
pub fn new_document_id() -> Result<String, AppError> {
    let mut bytes = [0u8; DOCUMENT_ID_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(hex::encode(bytes))
}

/// Serialize a record into a JSON object, dropping any `id` field.
pub fn to_document<T: Serialize>(record: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(record)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize record: {}", e)))?
    {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(AppError::Internal(anyhow::anyhow!(
            "Record did not serialize to an object: {}",
            other
        ))),
    }
}

/// Read the value of a uniquely indexed field as a string key.
pub fn unique_key(document: &Map<String, Value>, field: &str) -> Result<String, AppError> {
    match document.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => Err(AppError::Validation(format!(
            "Missing or non-scalar value for unique field '{}'",
            field
        ))),
    }
}

/// Document ID derived from a unique key.
///
/// Hex keeps the ID valid as a Firestore document ID and unchanged by
/// percent-decoding when it comes back as a URL path segment.
pub fn keyed_document_id(key: &str) -> String {
    hex::encode(key.as_bytes())
}

/// Extract unique keys for a batch, rejecting duplicates within the batch.
pub fn batch_unique_keys(
    documents: &[Map<String, Value>],
    collection: &str,
    field: &str,
) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::with_capacity(documents.len());
    let mut keys = Vec::with_capacity(documents.len());

    for document in documents {
        let key = unique_key(document, field)?;
        if !seen.insert(key.clone()) {
            return Err(AppError::DuplicateKey(format!(
                "{}.{} = {}",
                collection, field, key
            )));
        }
        keys.push(key);
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_new_document_id_format() {
        let a = new_document_id().unwrap();
        let b = new_document_id().unwrap();

        assert_eq!(a.len(), DOCUMENT_ID_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_to_document_strips_id() {
        let record = json!({"id": "abc", "name": "Tony"});
        let document = to_document(&record).unwrap();

        assert!(!document.contains_key("id"));
        assert_eq!(document["name"], "Tony");
    }

    #[test]
    fn test_to_document_rejects_non_object() {
        assert!(to_document(&42).is_err());
    }

    #[test]
    fn test_batch_unique_keys_detects_duplicates() {
        let docs = vec![
            doc(json!({"email": "a@x"})),
            doc(json!({"email": "b@x"})),
            doc(json!({"email": "a@x"})),
        ];

        let err = batch_unique_keys(&docs, "users", "email").unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey(_)));
    }

    #[test]
    fn test_unique_key_missing_field() {
        let document = doc(json!({"name": "x"}));
        let err = unique_key(&document, "email").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_keyed_document_id_is_path_safe() {
        let id = keyed_document_id("iron.man@marvel.com");

        assert_eq!(id, hex::encode("iron.man@marvel.com"));
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(keyed_document_id("a/b"), "612f62");
    }
}
