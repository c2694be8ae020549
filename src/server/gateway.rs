use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::{debug, info};

use crate::server::server::{AppState, RelayForwarder};

#[derive(Clone)]
pub struct GatewayState {
    forwarder: Arc<RelayForwarder>,
}

impl GatewayState {
    pub fn new(forwarder: Arc<RelayForwarder>) -> Self {
        Self { forwarder }
    }
}

impl GatewayState {
    pub async fn router(&self) -> Router<AppState> {
        info!("served paths: GET /fetch/{{id}}, POST /other/{{id}}");
        Router::new()
            .route("/fetch/{id}", get(fetch_application))
            .route("/other/{id}", post(call_other))
    }
}

async fn fetch_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
) -> Response {
    match state.gateway_state.forwarder.call_application(&id).await {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(_) => server_error(&method, &uri),
    }
}

async fn call_other(
    State(state): State<AppState>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    match state.gateway_state.forwarder.call_other_service(&id, body).await {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(_) => server_error(&method, &uri),
    }
}

/// Generic 500; the failure was already reported where it was detected.
fn server_error(method: &Method, uri: &Uri) -> Response {
    debug!("{} {} failed", method, uri.path());
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("500 Internal Server Error from {} {}", method, uri.path()),
    )
        .into_response()
}
