//! Model Module - Anomaly Scorer
//!
//! Two interchangeable strategies behind one `predict`:
//! - `trained.rs` + `forest.rs`: standardization + isolation forest, fit on
//!   the whole enrollment pool
//! - `zscore.rs`: per-user z-score fallback, used until a model exists

pub mod forest;
pub mod scorer;
pub mod trained;
pub mod types;
pub mod zscore;


pub use forest::{ForestError, IsolationForest};
pub use scorer::{AnomalyScorer, ScorerStatus, Strategy, StrategyKind, TrainOutcome};
pub use trained::{TrainError, TrainedModel};
pub use types::{DetectionMethod, DetectionStatus, Prediction};
