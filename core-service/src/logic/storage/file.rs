use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ModelStore, StorageError};
use crate::logic::model::TrainedModel;

const FORMAT_VERSION: u32 = 1;

/// On-disk envelope. `payload` is the JSON model, `checksum` its SHA-256.
#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    format_version: u32,
    checksum: String,
    payload: String,
}

#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn checksum(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Option<TrainedModel>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read(&self.path)?;
        let file: ModelFile = serde_json::from_slice(&data)?;

        if file.format_version != FORMAT_VERSION {
            return Err(StorageError::UnsupportedFormat(file.format_version));
        }

        let actual = checksum(&file.payload);
        if actual != file.checksum {
            return Err(StorageError::ChecksumMismatch {
                expected: file.checksum,
                actual,
            });
        }

        let model: TrainedModel = serde_json::from_str(&file.payload)?;
        model.validate()?;
        Ok(Some(model))
    }

    fn save(&self, model: &TrainedModel) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_string(model)?;
        let file = ModelFile {
            format_version: FORMAT_VERSION,
            checksum: checksum(&payload),
            payload,
        };

        // atomic replace
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(&file)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
