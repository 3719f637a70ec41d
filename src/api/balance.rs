use crate::api::AppState;
use crate::error::AppError;
use crate::orchestration::{BalanceView, StreamView};
use axum::extract::State;
use axum::Json;

pub async fn get_balance(State(state): State<AppState>) -> Result<Json<BalanceView>, AppError> {
    let view = state.scheduler.read().await.balance()?;
    Ok(Json(view))
}

/// Stream details. `loading` stays set until the first details read lands,
/// so `hasStream: false` only means "no stream" once it clears.
pub async fn get_stream(State(state): State<AppState>) -> Result<Json<StreamView>, AppError> {
    let details = state.scheduler.read().await.details()?;
    Ok(Json(details))
}
