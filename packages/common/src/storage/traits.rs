use async_trait::async_trait;

use super::error::StorageError;

/// Storage for uploaded media (recipe images).
///
/// Objects are addressed by a relative key of the form `{namespace}/{hash}.{extension}`.
/// Identical content under the same namespace and extension maps to the same key.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// The key `put` would store these bytes under, without writing anything.
    fn key_for(
        &self,
        namespace: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<String, StorageError>;

    /// Store bytes and return the key they were written under.
    async fn put(
        &self,
        namespace: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<String, StorageError>;

    /// Retrieve all bytes stored under a key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Validate a relative media key: non-empty segments of `[A-Za-z0-9._-]`,
/// no `.`/`..` segments, no hidden segments, no absolute paths.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".into()));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!("'{key}' is not relative")));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment.starts_with('.') {
            return Err(StorageError::InvalidKey(format!(
                "'{key}' contains an empty or hidden segment"
            )));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(StorageError::InvalidKey(format!(
                "'{key}' contains unsupported characters"
            )));
        }
    }
    Ok(())
}
