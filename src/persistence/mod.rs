//! Suspend/resume persistence
//!
//! Features:
//! - Flat, named-field JSON snapshot of a running session
//! - Every field required on load; a partial snapshot is rejected whole
//! - Opaque key-value blob store (directory of files, or memory for tests)

pub mod snapshot;
pub mod store;

pub use snapshot::{PeerSnapshot, Snapshot, load_snapshot, save_snapshot};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Errors reading or writing saved state
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("saved state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("saved state rejected: {0}")]
    Invalid(&'static str),
}
