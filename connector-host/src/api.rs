//! Connector host HTTP API.
//!
//! Exposes three routes:
//! - `GET /api/connectors` — list all connector schemas
//! - `GET /api/connectors/:name` — one connector schema
//! - `POST /api/connectors/:name/invoke` — run a connector against a
//!   caller-supplied context

use crate::connector::Invocation;
use crate::registry::find;
use crate::types::ConnectorSchema;
use crate::Connector;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use flowlink::context::LogEntry;
use flowlink::{ConnectorError, InvocationArgs, MemoryContext, SecretProvider, Transport};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn, Instrument};

/// Shared state for the connector API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub connectors: Vec<Arc<dyn Connector>>,
    pub secrets: Arc<dyn SecretProvider>,
    pub transport: Arc<dyn Transport>,
}

/// Request body for `POST /api/connectors/:name/invoke`.
#[derive(Debug, Default, Deserialize)]
pub struct InvokeRequest {
    /// Name of a configured secret; never echoed back or logged.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Conversation context before the call.
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Current input map before the call.
    #[serde(default)]
    pub input: Map<String, Value>,
}

/// Response for a completed invocation (including recorded errors).
#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub invocation_id: String,
    pub context: Map<String, Value>,
    pub input: Map<String, Value>,
    pub logs: Vec<LogEntry>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ---------------------------------------------------------------------------
// Business logic (called from HTTP handlers and unit tests)
// ---------------------------------------------------------------------------

/// Runs one connector invocation.
///
/// Resolves the secret reference, replays the supplied context and input
/// into a [`MemoryContext`], and returns the state after the call.
pub async fn handle_invoke(
    state: &ApiState,
    name: &str,
    req: InvokeRequest,
) -> Result<InvokeResponse, AppError> {
    let connector = find(&state.connectors, name)
        .ok_or_else(|| AppError::NotFound(format!("Connector '{}' not found", name)))?;

    let secret = match &req.secret {
        Some(secret_name) => Some(state.secrets.resolve(secret_name).ok_or_else(|| {
            AppError::BadRequest(format!("Secret '{}' is not configured", secret_name))
        })?),
        None => None,
    };

    let invocation_id = uuid::Uuid::new_v4().to_string();
    let args = InvocationArgs::new(req.args);
    let mut ctx = MemoryContext::with_state(req.context, req.input);

    info!(invocation_id = %invocation_id, connector = name, "Invocation started");

    let span = tracing::info_span!("invoke", invocation_id = %invocation_id, connector = name);
    let result = connector
        .invoke(Invocation {
            context: &mut ctx,
            secret: secret.as_ref(),
            args: &args,
            transport: state.transport.as_ref(),
        })
        .instrument(span)
        .await;

    match result {
        Ok(()) => {
            info!(invocation_id = %invocation_id, "Invocation completed");
            let (context, input, logs) = ctx.into_parts();
            Ok(InvokeResponse {
                invocation_id,
                context,
                input,
                logs,
            })
        }
        Err(e) => {
            warn!(invocation_id = %invocation_id, error = %e, "Invocation aborted");
            Err(AppError::from(e))
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP handlers
// ---------------------------------------------------------------------------

async fn list_connectors(State(state): State<Arc<ApiState>>) -> Json<Vec<ConnectorSchema>> {
    Json(state.connectors.iter().map(|c| c.schema()).collect())
}

async fn get_connector(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Json<ConnectorSchema>, AppError> {
    find(&state.connectors, &name)
        .map(|c| Json(c.schema()))
        .ok_or_else(|| AppError::NotFound(format!("Connector '{}' not found", name)))
}

async fn invoke_connector(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Json(req): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, AppError> {
    handle_invoke(&state, &name, req).await.map(Json)
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// The connector aborted (`stopOnError = true`).
    Failed(String),
}

impl From<ConnectorError> for AppError {
    fn from(e: ConnectorError) -> Self {
        if e.is_validation() {
            AppError::BadRequest(e.to_string())
        } else {
            AppError::Failed(e.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Failed(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        (status, Json(ErrorResponse { error: msg })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/connectors", get(list_connectors))
        .route("/api/connectors/:name", get(get_connector))
        .route("/api/connectors/:name/invoke", post(invoke_connector))
        .with_state(Arc::new(state))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
