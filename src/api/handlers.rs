//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::{sse_stream, SseEvent};
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, SessionCreatedResponse, SessionResponse,
};
use super::AppState;
use crate::conversation::SessionError;
use crate::orchestrator::TurnError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat page
        .route("/", get(serve_spa))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        // Turns
        .route("/api/sessions/:id/messages", post(send_message))
        .route("/api/sessions/:id/messages/stream", post(stream_message))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_spa() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionCreatedResponse> {
    let session_id = state.sessions.create().await;
    Json(SessionCreatedResponse { session_id })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    // A running turn shows up once it finishes
    let snapshot = state.sessions.snapshot(&id).await?;

    Ok(Json(SessionResponse {
        session_id: snapshot.id,
        messages: snapshot.messages,
        history: snapshot.history,
    }))
}

// ============================================================
// Turns
// ============================================================

/// Run a turn and answer once it is finalized
async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;
    let mut session = state.sessions.begin_turn(&id).await?;

    // Nobody listens for provisional updates on this route
    let (tx, _rx) = mpsc::unbounded_channel();
    let outcome = state
        .orchestrator
        .submit_user_message(&mut session, &req.text, &tx)
        .await?;

    Ok(Json(ChatResponse {
        user: outcome.user,
        response: outcome.response,
    }))
}

/// Run a turn and stream its progress as SSE.
///
/// The turn runs in its own task so that a disconnecting client cannot leave
/// the session half-updated.
async fn stream_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let mut session = state.sessions.begin_turn(&id).await?;

    let (tx, rx) = mpsc::unbounded_channel();
    let orchestrator = state.orchestrator.clone();
    let turn = tokio::spawn(async move {
        orchestrator
            .submit_user_message(&mut session, &req.text, &tx)
            .await
    });

    let updates = UnboundedReceiverStream::new(rx).map(SseEvent::from);
    let terminal = futures::stream::once(async move {
        match turn.await {
            Ok(Ok(outcome)) => SseEvent::Final {
                item: outcome.response,
            },
            Ok(Err(e)) => SseEvent::Error {
                message: e.to_string(),
            },
            Err(e) => {
                tracing::error!(error = %e, "Turn task failed");
                SseEvent::Error {
                    message: "turn failed unexpectedly".to_string(),
                }
            }
        }
    });

    Ok(sse_stream(updates.chain(terminal)))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("genui-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Busy(_) => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        match e {
            TurnError::Llm(_) => AppError::BadGateway(e.to_string()),
            TurnError::State(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::warn!(status = %status, error = %message, "Request failed");
        }

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
