//! Enrollment and login/detection handlers

use axum::{extract::State, Json};
use behavioral_dna_core::{extract_features, DetectionMethod, Session, TrainOutcome};
use serde::{Deserialize, Serialize};

use crate::models::LoginRecord;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub features: Session,
}

#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub status: &'static str,
    pub username: String,
    pub session_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    InsufficientData {
        status: &'static str,
        message: &'static str,
        score: u8,
    },
    Scored {
        username: String,
        status: &'static str,
        score: f64,
        message: String,
        method: DetectionMethod,
    },
}

/// Trimmed, lowercased; empty is rejected
fn normalize_username(raw: &str) -> AppResult<String> {
    let username = raw.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::ValidationError("username required".to_string()));
    }
    Ok(username)
}

/// Append a session to the user's profile, then retrain on the whole pool
pub async fn enroll(
    State(state): State<AppState>,
    Json(req): Json<DetectRequest>,
) -> AppResult<Json<EnrollResponse>> {
    let username = normalize_username(&req.username)?;

    let worker = state.clone();
    let user = username.clone();
    let (session_count, outcome) = tokio::task::spawn_blocking(move || -> AppResult<_> {
        // enrollments are serialized: each retrain sees a pool at least as large as the last
        let _gate = worker.enroll_gate.lock();
        let snapshot = worker.profiles.enroll(&user, req.features)?;
        let outcome = worker.scorer.train(&snapshot.pool);
        Ok((snapshot.session_count, outcome))
    })
    .await??;

    match &outcome {
        TrainOutcome::Trained { sample_count, persisted, .. } => {
            tracing::info!("Model retrained on {} sessions (persisted: {})", sample_count, persisted);
        }
        TrainOutcome::Skipped { sample_count, required } => {
            tracing::debug!("Pool has {}/{} sessions - not training yet", sample_count, required);
        }
        TrainOutcome::Failed { reason } => {
            tracing::warn!("Retrain failed, keeping previous model: {}", reason);
        }
    }

    tracing::info!("Enrolled session {} for '{}'", session_count, username);

    Ok(Json(EnrollResponse {
        status: "enrolled",
        username,
        session_count,
    }))
}

/// Score a login attempt against the user's profile
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<DetectRequest>,
) -> AppResult<Json<LoginResponse>> {
    let username = normalize_username(&req.username)?;

    let user_sessions = state.profiles.sessions(&username);
    if user_sessions.len() < state.scorer.config().min_user_sessions {
        return Ok(Json(LoginResponse::InsufficientData {
            status: "insufficient_data",
            message: "Not enough enrolled sessions. Please enroll more.",
            score: 0,
        }));
    }

    let prediction = state.scorer.predict(&req.features, &user_sessions);

    let record = LoginRecord::new(&username, &extract_features(&req.features), &prediction);
    if let Err(e) = state.login_log.append(&record) {
        tracing::warn!("Failed to log login attempt for '{}': {}", username, e);
    }

    tracing::info!(
        "Login '{}': {} (score {:.3}, {})",
        username,
        prediction.status.as_str(),
        prediction.score,
        prediction.method.as_str()
    );

    Ok(Json(LoginResponse::Scored {
        username,
        status: prediction.status.as_str(),
        score: prediction.score,
        message: prediction.message,
        method: prediction.method,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Alice ").unwrap(), "alice");
        assert!(matches!(normalize_username("   "), Err(AppError::ValidationError(_))));
        assert!(normalize_username("").is_err());
    }
}
