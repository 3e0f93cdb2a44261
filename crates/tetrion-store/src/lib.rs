//! Key/value persistence and observable settings for Tetrion.
//!
//! Everything persisted by the game goes through [`KeyValueStore`]: a string
//! keyed map of string values whose writes may fail. [`MemoryStore`] keeps
//! values in memory (optionally with a byte quota), [`FileStore`] keeps them
//! in a single JSON file, and [`SharedStore`] lets several owners write to the
//! same store on one thread.
//!
//! [`SpeedSetting`] is the persisted speed multiplier, exposed through an
//! [`Observable`] so a UI layer can react to changes.

use std::{io, path::PathBuf};

pub use self::{file::*, kv::*, memory::*, observable::*, speed::*};

mod file;
mod kv;
mod memory;
mod observable;
mod speed;

/// Failure of a store write.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum StoreError {
    /// The store has no room left for the value.
    #[display("storage quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },
    #[display("failed to access store file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to encode store contents: {source}")]
    Encode { source: serde_json::Error },
    /// The store refused the operation for a backend-specific reason.
    #[display("store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    /// Builds the error for an IO failure on `path`, classifying "disk full"
    /// and "quota exceeded" conditions as [`StoreError::QuotaExceeded`].
    #[must_use]
    pub fn from_io(key: &str, path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => Self::QuotaExceeded {
                key: key.to_owned(),
            },
            _ => Self::Io { path, source },
        }
    }
}
