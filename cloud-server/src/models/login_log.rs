//! Login attempts, appended to a CSV file

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use behavioral_dna_core::{FeatureVector, Prediction};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRecord {
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub status: String,
    pub score: f64,
    pub avg_interval: f64,
    pub avg_hold_time: f64,
    pub typing_speed: f64,
    pub backspace_count: f64,
    pub total_keys: f64,
    pub mouse_speed: f64,
}

impl LoginRecord {
    pub fn new(username: &str, features: &FeatureVector, prediction: &Prediction) -> Self {
        let [avg_interval, avg_hold_time, typing_speed, backspace_count, total_keys, mouse_speed] =
            features.values;
        Self {
            timestamp: Utc::now(),
            username: username.to_string(),
            status: prediction.status.as_str().to_string(),
            score: (prediction.score * 10_000.0).round() / 10_000.0,
            avg_interval,
            avg_hold_time,
            typing_speed,
            backspace_count,
            total_keys,
            mouse_speed,
        }
    }
}

pub struct LoginLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LoginLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Header is written only when the file is new or empty
    pub fn append(&self, record: &LoginRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// All records, oldest first; no file → empty
    pub fn read_all(&self) -> Result<Vec<LoginRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<LoginRecord>, csv::Error>>()?;
        Ok(records)
    }
}
