use hostel_kv::KVError;
use thiserror::Error;

/// Errors surfaced by the session and complaint stores.
///
/// Failed logins and status updates on unknown ids are outcomes, not
/// errors; only the persistence layer can fail a call.
#[derive(Debug, Error)]
pub enum HostelError {
    #[error("storage: {0}")]
    Storage(String),

    #[error("serialization: {0}")]
    Serialization(String),
}

impl From<KVError> for HostelError {
    fn from(e: KVError) -> Self {
        match e {
            KVError::Storage(m) => HostelError::Storage(m),
            KVError::Serialization(m) => HostelError::Serialization(m),
        }
    }
}
