use crate::api::AppState;
use crate::error::AppError;
use crate::orchestration::WithdrawAmount;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    /// Decimal units ("1.5") or "max".
    pub amount: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub tx_hash: String,
}

pub async fn withdraw(
    State(state): State<AppState>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<WithdrawResponse>, AppError> {
    let amount = WithdrawAmount::from_str(&request.amount)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    // Release the scheduler before the write so a slow node cannot hold up
    // disconnect or an address switch.
    let prepared = state.scheduler.read().await.prepare_withdraw(amount)?;
    let tx_hash = prepared.submit().await?;
    Ok(Json(WithdrawResponse {
        tx_hash: tx_hash.to_string(),
    }))
}
