//! Trained Scorer State - standardization + isolation forest
//!
//! Built in one piece from the whole enrollment pool and never mutated
//! afterwards. Retraining produces a new `TrainedModel`.

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::config::ScorerConfig;
use crate::logic::features::layout::{layout_hash, validate_layout};
use crate::logic::features::{
    extract_features, to_matrix, FeatureError, Session, StandardScaler, FEATURE_COUNT,
    FEATURE_VERSION,
};
use crate::logic::storage::StorageError;

use super::forest::{ForestError, ForestParams, IsolationForest};
use super::types::{DetectionMethod, DetectionStatus, Prediction};

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("pool has {actual} sessions, need at least {required}")]
    InsufficientPool { required: usize, actual: usize },

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Forest(#[from] ForestError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub sample_count: usize,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub scaler: StandardScaler,
    pub forest: IsolationForest,
}

impl TrainedModel {
    /// Fit scaler and forest on the full pool
    pub fn fit(all_sessions: &[Session], config: &ScorerConfig) -> Result<Self, TrainError> {
        if all_sessions.len() < config.min_training_sessions {
            return Err(TrainError::InsufficientPool {
                required: config.min_training_sessions,
                actual: all_sessions.len(),
            });
        }

        let raw = to_matrix(all_sessions);
        let scaler = StandardScaler::fit(&raw, config.std_epsilon)?;
        let scaled = scaler.transform(&raw);

        let forest = IsolationForest::fit(
            &scaled,
            &ForestParams {
                n_estimators: config.n_estimators,
                max_samples: config.max_samples,
                contamination: config.contamination,
                seed: config.random_seed,
            },
        )?;

        Ok(Self {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            sample_count: all_sessions.len(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            scaler,
            forest,
        })
    }

    /// Reject a bundle from another feature layout, or one whose parameters
    /// could not have come from `fit`
    pub fn validate(&self) -> Result<(), StorageError> {
        validate_layout(self.feature_version, self.layout_hash)?;
        if !self.scaler.is_well_formed() {
            return Err(StorageError::InvalidModel(
                "standardization parameters are not finite".to_string(),
            ));
        }
        self.forest
            .validate(FEATURE_COUNT)
            .map_err(|e| StorageError::InvalidModel(e.to_string()))
    }

    /// Same fitted parameters (ignores id and timestamp)
    pub fn same_parameters(&self, other: &TrainedModel) -> bool {
        self.scaler == other.scaler && self.forest == other.forest
    }

    /// Score one session. The label comes from the forest's decision boundary;
    /// the 0-1 score from the fixed affine clip of the raw score. The two can
    /// disagree near the boundary.
    pub fn predict(&self, session: &Session, config: &ScorerConfig) -> Prediction {
        let scaled = Array1::from(self.scaler.transform_vector(&extract_features(session)).to_vec());

        let raw_score = self.forest.score_sample(scaled.view());
        let is_anomaly = self.forest.is_outlier(scaled.view());
        let score = config.normalize_raw_score(raw_score);

        log::debug!(
            "isolation_forest: raw={:.4} offset={:.4} score={:.3} anomaly={}",
            raw_score,
            self.forest.offset(),
            score,
            is_anomaly
        );

        Prediction {
            status: DetectionStatus::from_flag(is_anomaly),
            score,
            message: if is_anomaly {
                "Anomaly detected by Isolation Forest.".to_string()
            } else {
                "Behavioral pattern within normal range.".to_string()
            },
            method: DetectionMethod::IsolationForest,
            raw_score: Some(raw_score),
            max_z: None,
        }
    }
}
