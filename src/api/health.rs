use crate::api::AppState;
use axum::extract::State;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once a session is connected and its first stream read has landed.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let scheduler = state.scheduler.read().await;
    let loading = scheduler.balance().map(|view| view.loading).unwrap_or(true);
    Json(serde_json::json!({
        "status": if loading { "waiting" } else { "ready" },
        "connection": scheduler.state(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::datasource::MockDataSource;
    use crate::orchestration::{Scheduler, SystemClock};
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(Scheduler::new(
            Arc::new(MockDataSource::new()),
            Arc::new(SystemClock),
            SessionConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_waits_without_session() {
        let Json(body) = ready(State(state())).await;
        assert_eq!(body["status"], "waiting");
        assert_eq!(body["connection"], "disconnected");
    }
}
