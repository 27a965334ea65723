//! Z-score fallback - compares a session with the user's own history
//!
//! Always available. Needs at least `min_user_sessions` reference sessions,
//! otherwise reports insufficient data as a normal result.

use crate::logic::config::ScorerConfig;
use crate::logic::features::{extract_features, to_matrix, Session, StandardScaler};

use super::types::{DetectionMethod, DetectionStatus, Prediction};

/// Per-dimension |z| of `session` against `user_sessions`.
/// `None` when there is not enough history.
pub fn z_scores(session: &Session, user_sessions: &[Session], config: &ScorerConfig) -> Option<Vec<f64>> {
    if user_sessions.len() < config.min_user_sessions || user_sessions.is_empty() {
        return None;
    }
    let reference = StandardScaler::fit(&to_matrix(user_sessions), config.std_epsilon).ok()?;
    let z = reference.transform_vector(&extract_features(session));
    Some(z.iter().map(|v| v.abs()).collect())
}

pub fn predict(session: &Session, user_sessions: &[Session], config: &ScorerConfig) -> Prediction {
    let Some(z) = z_scores(session, user_sessions, config) else {
        return Prediction::insufficient_data();
    };

    let max_z = z.iter().copied().fold(0.0, f64::max);
    let avg_z = z.iter().sum::<f64>() / z.len() as f64;

    let score = (avg_z / config.z_threshold).clamp(0.0, 1.0);
    let is_anomaly = max_z > config.z_threshold;

    log::debug!("zscore: max_z={:.3} avg_z={:.3} anomaly={}", max_z, avg_z, is_anomaly);

    Prediction {
        status: DetectionStatus::from_flag(is_anomaly),
        score,
        message: format!(
            "Max z-score: {:.2}. {}",
            max_z,
            if is_anomaly { "Anomaly detected." } else { "Within normal range." }
        ),
        method: DetectionMethod::Zscore,
        raw_score: None,
        max_z: Some(max_z),
    }
}
