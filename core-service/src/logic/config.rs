//! Scorer Configuration
//!
//! Every tunable of the scoring engine in one place.

use serde::{Deserialize, Serialize};

use crate::constants::{
    self, DEFAULT_CONTAMINATION, DEFAULT_ESTIMATORS, DEFAULT_MAX_SAMPLES, DEFAULT_RANDOM_SEED,
    MIN_TRAINING_SESSIONS, MIN_USER_SESSIONS, SCORE_OFFSET, SCORE_SPAN, STD_EPSILON,
    Z_SCORE_THRESHOLD,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Trees in the isolation forest
    pub n_estimators: usize,

    /// Rows drawn (without replacement) per tree, capped by pool size
    pub max_samples: usize,

    /// Expected outlier proportion; sets the forest decision offset
    pub contamination: f64,

    /// Forest RNG seed
    pub random_seed: u64,

    /// Pool size below which `train` is a no-op
    pub min_training_sessions: usize,

    /// User history size below which the fallback reports insufficient data
    pub min_user_sessions: usize,

    /// Max per-dimension z-score before the fallback flags an anomaly
    pub z_threshold: f64,

    /// Added to every std before dividing
    pub std_epsilon: f64,

    /// Affine mapping of raw forest scores into [0, 1]
    pub score_offset: f64,
    pub score_span: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_ESTIMATORS,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination: DEFAULT_CONTAMINATION,
            random_seed: DEFAULT_RANDOM_SEED,
            min_training_sessions: MIN_TRAINING_SESSIONS,
            min_user_sessions: MIN_USER_SESSIONS,
            z_threshold: Z_SCORE_THRESHOLD,
            std_epsilon: STD_EPSILON,
            score_offset: SCORE_OFFSET,
            score_span: SCORE_SPAN,
        }
    }
}

impl ScorerConfig {
    /// Defaults, with seed and ensemble size overridable from the environment
    pub fn from_env() -> Self {
        let config = Self {
            n_estimators: constants::get_estimators(),
            random_seed: constants::get_random_seed(),
            ..Default::default()
        };
        if config.n_estimators != DEFAULT_ESTIMATORS || config.random_seed != DEFAULT_RANDOM_SEED {
            log::info!(
                "Forest overridden from environment: n_estimators={} (default {}), random_seed={} (default {})",
                config.n_estimators,
                DEFAULT_ESTIMATORS,
                config.random_seed,
                DEFAULT_RANDOM_SEED
            );
        }
        config
    }

    /// Map a raw forest score (more negative = more anomalous) into [0, 1]
    pub fn normalize_raw_score(&self, raw_score: f64) -> f64 {
        ((-raw_score - self.score_offset) / self.score_span).clamp(0.0, 1.0)
    }
}
