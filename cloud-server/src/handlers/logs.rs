//! Login attempt log

use axum::{extract::State, Json};

use crate::models::LoginRecord;
use crate::{AppResult, AppState};

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<LoginRecord>>> {
    let log = state.login_log.clone();
    let records = tokio::task::spawn_blocking(move || log.read_all()).await??;
    Ok(Json(records))
}
