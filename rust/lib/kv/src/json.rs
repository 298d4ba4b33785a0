use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::KVError;
use crate::traits::KVStore;

/// Typed JSON access on top of any [`KVStore`].
///
/// A key holds exactly one serialized document. A present-but-unparseable
/// value is reported as `KVError::Serialization` so callers can pick their
/// own recovery policy.
pub trait JsonKV {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KVError>;

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), KVError>;
}

impl<S: KVStore + ?Sized> JsonKV for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KVError> {
        let Some(bytes) = self.get(key)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| KVError::Serialization(format!("{key}: {e}")))
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), KVError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| KVError::Serialization(format!("{key}: {e}")))?;
        self.set(key, &bytes)
    }
}
