use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::assistant::DynAssistant;
use crate::service::NewsService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
    pub assistant: DynAssistant,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/get_news", get(get_news))
        .route("/ask-question", post(ask_question))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Latest enriched records, refreshing synchronously first on a cold cache.
/// An empty pipeline outcome is the client's problem (no news), not ours.
async fn get_news(State(state): State<AppState>) -> Response {
    match state.service.latest().await {
        Some(snap) => (StatusCode::OK, Json(snap.records.clone())).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No financial news available." })),
        )
            .into_response(),
    }
}

#[derive(serde::Deserialize)]
struct AskReq {
    query: Option<String>,
}

async fn ask_question(State(state): State<AppState>, Json(body): Json<AskReq>) -> Response {
    let Some(query) = body.query.filter(|q| !q.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No question provided" })),
        )
            .into_response();
    };

    let answer = match state.assistant.ask(&query).await {
        Some(a) => a,
        None => "Sorry, the assistant could not process the question.".to_string(),
    };
    (StatusCode::OK, Json(json!({ "answer": answer }))).into_response()
}
