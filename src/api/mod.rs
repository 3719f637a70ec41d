pub mod balance;
pub mod health;
pub mod session;
pub mod withdraw;

use crate::orchestration::Scheduler;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<RwLock<Scheduler>>,
}

impl AppState {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/session",
            get(session::get_session)
                .post(session::connect)
                .delete(session::disconnect),
        )
        .route("/v1/balance", get(balance::get_balance))
        .route("/v1/stream", get(balance::get_stream))
        .route("/v1/withdraw", post(withdraw::withdraw))
        .layer(cors)
        .with_state(state)
}
