//! Enrolled users and their session counts

use std::collections::BTreeMap;

use axum::{extract::State, Json};

use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Json<BTreeMap<String, usize>> {
    Json(state.profiles.counts())
}
