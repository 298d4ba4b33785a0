use crate::error::KVError;

/// KVStore is the persistence seam shared by the session and complaint stores.
///
/// Every value is stored as a whole unit under its key; there is no partial
/// write path. Implementations must be usable from any thread.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Replace the value stored under a key.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Check whether a key currently holds a value.
    fn contains(&self, key: &str) -> Result<bool, KVError> {
        Ok(self.get(key)?.is_some())
    }
}
