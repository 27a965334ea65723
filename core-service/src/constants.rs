//! Central Configuration Constants
//!
//! Single source of truth for scoring defaults.
//! `ScorerConfig::default()` is built from these values.

use std::path::PathBuf;

/// Minimum pool size (all users) before the isolation forest is trained
pub const MIN_TRAINING_SESSIONS: usize = 3;

/// Minimum sessions a user needs before the z-score fallback can judge
pub const MIN_USER_SESSIONS: usize = 2;

/// Standard deviations for the z-score fallback
pub const Z_SCORE_THRESHOLD: f64 = 2.5;

/// Added to every standard deviation before dividing
pub const STD_EPSILON: f64 = 1e-6;

/// Isolation forest ensemble size
pub const DEFAULT_ESTIMATORS: usize = 100;

/// Upper bound on rows drawn per tree
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Expected share of outliers in the training pool
pub const DEFAULT_CONTAMINATION: f64 = 0.1;

/// Fixed seed so retraining on the same pool is reproducible
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Raw forest scores are mapped with `clip((-raw - OFFSET) / SPAN, 0, 1)`.
/// Typical raw range is roughly -0.8 to -0.3.
pub const SCORE_OFFSET: f64 = 0.3;
pub const SCORE_SPAN: f64 = 0.5;

/// App name (used for the data directory)
pub const APP_NAME: &str = "behavioral-dna";

/// Model bundle file name
pub const MODEL_FILE_NAME: &str = "model_v1.json";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Default location of the persisted model bundle
pub fn get_default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(MODEL_FILE_NAME)
}

/// Get forest seed from environment or use default
pub fn get_random_seed() -> u64 {
    std::env::var("BDNA_RANDOM_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RANDOM_SEED)
}

/// Get ensemble size from environment or use default
pub fn get_estimators() -> usize {
    std::env::var("BDNA_ESTIMATORS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(DEFAULT_ESTIMATORS)
}
