//! HTTP surface of the analysis and chat proxies.
//!
//! Both endpoints answer CORS pre-flights with an empty body, require a JSON
//! body, and report every failure as `{ "error": message }` with a 400, 429 or
//! 500 status. Transport failures are logged in full but answered with a fixed
//! message.

use crate::config::ProxyConfig;
use crate::error::{Result, StatementError};
use crate::service::{ANALYZE_PATH, CHAT_PATH};
use crate::llm::{
    AnalyzeRequest, AnalyzeResponse, ChatRequest, ChatResponse, DocumentAssistant,
    GenerativeModel, StatementAnalyzer,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// A 20 MiB PDF grows by a third once base64 encoded; leave room for chat history.
const MAX_REQUEST_BYTES: usize = 40 * 1024 * 1024;

pub struct ProxyState {
    analyzer: StatementAnalyzer,
    assistant: DocumentAssistant,
}

impl ProxyState {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, config: &ProxyConfig) -> Result<Self> {
        if model.is_none() {
            warn!("No upstream credential configured; proxy calls will fail until GEMINI_API_KEY is set");
        }
        Ok(Self {
            analyzer: StatementAnalyzer::new(model.clone(), config.analysis_options())?,
            assistant: DocumentAssistant::new(model, config.chat_options()),
        })
    }

    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        Self::new(config.upstream_model(), config)
    }
}

pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route(ANALYZE_PATH, post(analyze_statement))
        .route(CHAT_PATH, post(chat_statement))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config.bind_addr` and serves until the process stops.
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let state = Arc::new(ProxyState::from_config(&config)?);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Statement proxy listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn analyze_statement(
    State(state): State<Arc<ProxyState>>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match state.analyzer.analyze(&request).await {
        Ok(data) => Json(AnalyzeResponse { data }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn chat_statement(
    State(state): State<Arc<ProxyState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match state.assistant.reply(&request).await {
        Ok(reply) => Json(ChatResponse { reply }).into_response(),
        Err(e) => e.into_response(),
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    // Well-formed JSON of the wrong shape is still bad input.
    let status = match &rejection {
        JsonRejection::JsonDataError(_) => StatusCode::BAD_REQUEST,
        other => other.status(),
    };
    (status, Json(json!({ "error": rejection.body_text() }))).into_response()
}

impl IntoResponse for StatementError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Proxy call failed: {}", self);
        } else {
            warn!("Proxy call rejected: {}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
