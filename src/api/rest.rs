use axum::{
    extract::State,
    response::{Html, Json},
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::websocket::ws_handler;
use crate::config::UPDATE_TIME;
use crate::services::poller::StatsSnapshot;
use crate::services::render::{self, Screen};
use crate::services::{PollerHandle, ViewState};

pub struct AppState {
    pub poller: Arc<PollerHandle>,
}

/// GET / - the dashboard page
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let screen = render::screen(&state.poller.view());
    Html(screen.to_html(UPDATE_TIME.as_secs()))
}

/// GET /card - same screen as plain text
async fn card(State(state): State<Arc<AppState>>) -> String {
    render::screen(&state.poller.view()).to_text()
}

/// GET /supply
async fn supply(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let view = state.poller.view();
    let body = match (&view, render::screen(&view)) {
        (ViewState::Loaded { snapshot, updated_at }, Screen::Card(card)) => json!({
            "status": "loaded",
            "updated_at": updated_at,
            "lines": card.lines,
            "snapshot": snapshot,
        }),
        _ => json!({ "status": "loading" }),
    };
    Json(body)
}

/// GET /stats
async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.poller.stats())
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/card", get(card))
        .route("/supply", get(supply))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::services::SupplyPoller;
    use crate::sources::SupplySource;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FixedSource(Value);

    #[async_trait]
    impl SupplySource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_supply(&self) -> Result<Value, SourceError> {
            Ok(self.0.clone())
        }
    }

    async fn router_for(payload: Value) -> Router {
        let poller = SupplyPoller::new(Arc::new(FixedSource(payload))).start();
        tokio::time::sleep(Duration::from_millis(10)).await;
        create_router(Arc::new(AppState {
            poller: Arc::new(poller),
        }))
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn card_endpoint_renders_loaded_snapshot() {
        let app = router_for(json!({ "total_supply": "100000000000000000000000000" })).await;
        let (status, body) = get_body(app, "/card").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("Gravity Supply Info\n"));
        assert!(body.contains("Total Supply: 100.00M ALTHEA"));
        assert!(body.contains("Vested: NaNM ALTHEA"));
    }

    #[tokio::test(start_paused = true)]
    async fn supply_endpoint_reports_loading_for_string_payload() {
        let app = router_for(json!("Info not yet generated, please query in 5 minutes")).await;
        let (_, body) = get_body(app, "/supply").await;

        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "loading");
    }

    #[tokio::test(start_paused = true)]
    async fn index_serves_html_page() {
        let app = router_for(json!({ "total_supply": 1e26 })).await;
        let (status, body) = get_body(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Althea L1 Info</title>"));
        assert!(body.contains("Total Supply: 100.00M ALTHEA"));
    }

    #[tokio::test(start_paused = true)]
    async fn stats_and_health() {
        let app = router_for(json!({ "total_supply": 1 })).await;
        let (_, body) = get_body(app.clone(), "/stats").await;
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["issued"], 1);
        assert_eq!(value["committed"], 1);

        let (status, body) = get_body(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
