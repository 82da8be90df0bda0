use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{KeyValueStore, StorageError};

/// Read and decode a JSON value. A missing key is `Ok(None)`; undecodable
/// data is `StorageError::Serialization`.
///
/// # Errors
///
/// Returns `StorageError` when the read fails or the value is not valid JSON for `T`.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError` when encoding or the write fails.
pub async fn write_json<T: Serialize + Sync + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)
        .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))?;
    store.set(key, &raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = InMemoryStore::new();
        let value: Option<Vec<u32>> = read_json(&store, "absent").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn corrupt_json_is_a_serialization_error() {
        let store = InMemoryStore::new();
        store.set("k", "{not json").await.unwrap();
        let err = read_json::<Vec<u32>>(&store, "k").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(msg) if msg.starts_with("k:")));
    }

    #[tokio::test]
    async fn writes_then_reads_value() {
        let store = InMemoryStore::new();
        write_json(&store, "k", &vec![1_u32, 2, 3]).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("[1,2,3]"));
        let back: Option<Vec<u32>> = read_json(&store, "k").await.unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }
}
