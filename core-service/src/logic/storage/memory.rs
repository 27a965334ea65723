use parking_lot::Mutex;

use super::{ModelStore, StorageError};
use crate::logic::model::TrainedModel;

/// Keeps the bundle in memory. `save_count` lets tests observe writes.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    slot: Mutex<Option<TrainedModel>>,
    saves: Mutex<usize>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            slot: Mutex::new(Some(model)),
            saves: Mutex::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    pub fn stored(&self) -> Option<TrainedModel> {
        self.slot.lock().clone()
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Option<TrainedModel>, StorageError> {
        let model = self.slot.lock().clone();
        if let Some(m) = &model {
            m.validate()?;
        }
        Ok(model)
    }

    fn save(&self, model: &TrainedModel) -> Result<(), StorageError> {
        *self.slot.lock() = Some(model.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}
