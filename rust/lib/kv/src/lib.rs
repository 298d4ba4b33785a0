//! Durable key-value storage for the hostel stores.
//!
//! Each store persists one JSON document per fixed key (`user`,
//! `complaints`). [`KVStore`] is the seam; [`RedbStore`] survives restarts,
//! [`MemoryKV`] lives only as long as the process.

pub mod error;
pub mod json;
pub mod memory;
pub mod redb;
pub mod traits;

pub use error::KVError;
pub use json::JsonKV;
pub use memory::MemoryKV;
pub use redb::RedbStore;
pub use traits::KVStore;
