//! Anomaly Scorer - owns the trained state and dispatches predictions
//!
//! Concurrency contract:
//! - `train` builds a complete `TrainedModel` off-lock, then swaps the `Arc`
//!   in under a short write lock. Trainings are serialized by `train_lock`.
//! - `predict` clones the current `Arc` under a read lock and scores without
//!   holding any lock, so it sees either the old or the new model, never a mix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::config::ScorerConfig;
use crate::logic::features::layout::LayoutInfo;
use crate::logic::features::Session;
use crate::logic::storage::{ModelStore, StorageError};

use super::trained::TrainedModel;
use super::types::{DetectionMethod, Prediction};
use super::zscore;

// ============================================================================
// STRATEGY
// ============================================================================

/// Which scoring path `predict` takes right now
#[derive(Debug, Clone)]
pub enum Strategy {
    Trained(Arc<TrainedModel>),
    Fallback,
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Trained(_) => StrategyKind::Trained,
            Self::Fallback => StrategyKind::Fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Trained,
    Fallback,
}

/// Result of a `train` call. Never an error: the caller keeps serving.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainOutcome {
    Trained {
        model_id: Uuid,
        sample_count: usize,
        persisted: bool,
    },
    /// Pool below the training threshold; nothing changed
    Skipped { sample_count: usize, required: usize },
    /// Fit failed; the previous state is kept
    Failed { reason: String },
}

impl TrainOutcome {
    pub fn is_trained(&self) -> bool {
        matches!(self, Self::Trained { .. })
    }
}

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Default)]
struct ScorerMetrics {
    forest_predictions: AtomicU64,
    zscore_predictions: AtomicU64,
    insufficient_predictions: AtomicU64,
    latency_sum_us: AtomicU64,
    trainings: AtomicU64,
    load_failures: AtomicU64,
    save_failures: AtomicU64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerStatus {
    pub strategy: StrategyKind,
    pub model_id: Option<Uuid>,
    pub trained_at: Option<DateTime<Utc>>,
    pub trained_sample_count: Option<usize>,
    pub isolation_forest_predictions: u64,
    pub zscore_predictions: u64,
    pub insufficient_data_predictions: u64,
    pub avg_latency_ms: f64,
    pub trainings: u64,
    pub load_failures: u64,
    pub save_failures: u64,
    pub last_storage_error: Option<String>,
    pub layout: LayoutInfo,
}

// ============================================================================
// SCORER
// ============================================================================

pub struct AnomalyScorer {
    config: ScorerConfig,
    store: Box<dyn ModelStore>,
    state: RwLock<Option<Arc<TrainedModel>>>,
    train_lock: Mutex<()>,
    metrics: ScorerMetrics,
    last_storage_error: RwLock<Option<String>>,
}

impl AnomalyScorer {
    /// Create a scorer and load any previously saved model from `store`.
    /// A failed load leaves the scorer untrained.
    pub fn new(config: ScorerConfig, store: impl ModelStore + 'static) -> Self {
        let scorer = Self {
            config,
            store: Box::new(store),
            state: RwLock::new(None),
            train_lock: Mutex::new(()),
            metrics: ScorerMetrics::default(),
            last_storage_error: RwLock::new(None),
        };

        match scorer.store.load() {
            Ok(Some(model)) => {
                log::info!(
                    "Loaded saved model {} (trained {} on {} sessions)",
                    model.model_id,
                    model.trained_at,
                    model.sample_count
                );
                *scorer.state.write() = Some(Arc::new(model));
            }
            Ok(None) => log::info!("No saved model - using z-score fallback until trained"),
            Err(e) => {
                log::warn!("Could not load model: {}. Starting untrained.", e);
                scorer.metrics.load_failures.fetch_add(1, Ordering::Relaxed);
                scorer.record_storage_error(&e);
            }
        }

        scorer
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn current_strategy(&self) -> Strategy {
        match self.state.read().as_ref() {
            Some(model) => Strategy::Trained(Arc::clone(model)),
            None => Strategy::Fallback,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.state.read().is_some()
    }

    /// Retrain on the entire pool. Below the threshold this is a no-op.
    pub fn train(&self, all_sessions: &[Session]) -> TrainOutcome {
        let _guard = self.train_lock.lock();

        let required = self.config.min_training_sessions;
        if all_sessions.len() < required {
            log::debug!("Skipping training: {} of {} sessions", all_sessions.len(), required);
            return TrainOutcome::Skipped {
                sample_count: all_sessions.len(),
                required,
            };
        }

        let model = match TrainedModel::fit(all_sessions, &self.config) {
            Ok(model) => Arc::new(model),
            Err(e) => {
                log::error!("Training failed: {}", e);
                return TrainOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        *self.state.write() = Some(Arc::clone(&model));
        self.metrics.trainings.fetch_add(1, Ordering::Relaxed);
        log::info!("Model trained on {} sessions.", model.sample_count);

        let persisted = match self.store.save(&model) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to persist model {}: {}", model.model_id, e);
                self.metrics.save_failures.fetch_add(1, Ordering::Relaxed);
                self.record_storage_error(&e);
                false
            }
        };

        TrainOutcome::Trained {
            model_id: model.model_id,
            sample_count: model.sample_count,
            persisted,
        }
    }

    /// Trained model if present, otherwise z-score against `user_sessions`
    pub fn predict(&self, session: &Session, user_sessions: &[Session]) -> Prediction {
        let start = Instant::now();

        let prediction = match self.current_strategy() {
            Strategy::Trained(model) => model.predict(session, &self.config),
            Strategy::Fallback => zscore::predict(session, user_sessions, &self.config),
        };

        let counter = match prediction.method {
            DetectionMethod::IsolationForest => &self.metrics.forest_predictions,
            DetectionMethod::Zscore => &self.metrics.zscore_predictions,
            DetectionMethod::None => &self.metrics.insufficient_predictions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);

        prediction
    }

    pub fn status(&self) -> ScorerStatus {
        let strategy = self.current_strategy();
        let model = match &strategy {
            Strategy::Trained(m) => Some(Arc::clone(m)),
            Strategy::Fallback => None,
        };

        let m = &self.metrics;
        let forest = m.forest_predictions.load(Ordering::Relaxed);
        let zscore = m.zscore_predictions.load(Ordering::Relaxed);
        let none = m.insufficient_predictions.load(Ordering::Relaxed);
        let total = forest + zscore + none;
        let avg_latency_ms = if total > 0 {
            m.latency_sum_us.load(Ordering::Relaxed) as f64 / total as f64 / 1000.0
        } else {
            0.0
        };

        ScorerStatus {
            strategy: strategy.kind(),
            model_id: model.as_ref().map(|m| m.model_id),
            trained_at: model.as_ref().map(|m| m.trained_at),
            trained_sample_count: model.as_ref().map(|m| m.sample_count),
            isolation_forest_predictions: forest,
            zscore_predictions: zscore,
            insufficient_data_predictions: none,
            avg_latency_ms,
            trainings: m.trainings.load(Ordering::Relaxed),
            load_failures: m.load_failures.load(Ordering::Relaxed),
            save_failures: m.save_failures.load(Ordering::Relaxed),
            last_storage_error: self.last_storage_error.read().clone(),
            layout: LayoutInfo::current(),
        }
    }

    fn record_storage_error(&self, err: &StorageError) {
        *self.last_storage_error.write() = Some(err.to_string());
    }
}
