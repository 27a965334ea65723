//! Storage Module - Trained Model Persistence
//!
//! The scorer only needs `load` once at construction and `save` once per
//! successful training. Every failure is a `StorageError`; the scorer treats
//! it as "untrained" and keeps serving through the fallback.
//!
//! - `file.rs`: JSON envelope on disk, SHA-256 checksummed, layout-validated
//! - `memory.rs`: in-process store (tests, ephemeral deployments)

pub mod file;
pub mod memory;
#[cfg(test)]
mod tests;

use crate::logic::features::layout::LayoutMismatchError;
use crate::logic::model::TrainedModel;

pub use file::FileModelStore;
pub use memory::MemoryModelStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("unsupported model file format v{0}")]
    UnsupportedFormat(u32),

    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Durable home of the trained model bundle
pub trait ModelStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<TrainedModel>, StorageError>;

    /// Overwrites any previously saved model
    fn save(&self, model: &TrainedModel) -> Result<(), StorageError>;
}

impl<T: ModelStore + ?Sized> ModelStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<TrainedModel>, StorageError> {
        (**self).load()
    }

    fn save(&self, model: &TrainedModel) -> Result<(), StorageError> {
        (**self).save(model)
    }
}
