//! BehavioralDNA Core - Session Anomaly Scoring Engine
//!
//! Decides whether a keystroke/mouse session resembles the sessions a user
//! enrolled before.
//!
//! # Architecture
//!
//! ```text
//!   Session ──► features::extract_features ──► FeatureVector
//!                                                   │
//!                      ┌────────────────────────────┴───────────┐
//!                      ▼                                        ▼
//!          Strategy::Trained                          Strategy::Fallback
//!   (StandardScaler + IsolationForest,          (per-user z-score against
//!    fit on the whole enrollment pool)           that user's own sessions)
//!                      └────────────────┬───────────────────────┘
//!                                       ▼
//!                            Prediction {status, score, message, method}
//! ```
//!
//! `AnomalyScorer` owns the trained state and swaps it atomically on retrain.
//! Persistence goes through the `ModelStore` trait.

pub mod constants;
pub mod logic;

pub use logic::config::ScorerConfig;
pub use logic::features::{extract_features, FeatureVector, Session, StandardScaler};
pub use logic::model::{
    AnomalyScorer, DetectionMethod, DetectionStatus, Prediction, ScorerStatus, Strategy,
    TrainOutcome, TrainedModel,
};
pub use logic::storage::{FileModelStore, MemoryModelStore, ModelStore, StorageError};
