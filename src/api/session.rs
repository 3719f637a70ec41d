use crate::api::AppState;
use crate::domain::Address;
use crate::error::AppError;
use crate::orchestration::SessionKey;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub address: String,
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionKey> {
    Json(state.scheduler.read().await.key())
}

/// Connect, or switch to a different address.
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<SessionKey>, AppError> {
    let address = Address::from_str(&request.address)
        .map_err(|_| AppError::BadRequest("Invalid address".into()))?;
    let key = state.scheduler.write().await.connect(address).await?;
    Ok(Json(key))
}

pub async fn disconnect(State(state): State<AppState>) -> Json<SessionKey> {
    let (key, _) = state.scheduler.write().await.disconnect().await;
    Json(key)
}
