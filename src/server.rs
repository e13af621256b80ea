//! Web server module for netsnap.
//!
//! Exposes the diagnostic collector over a small JSON API. Every probe
//! endpoint takes `{"ip": "...", "community": "..."}` in a POST body.

mod auth;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer,
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::collector::{
    DiagnosticCollector, PingMetrics, PingStatus, ProbeTarget, SnmpReport, TargetValidationError,
};
use crate::config::AuthConfig;
use crate::report::build_prompt;

/// Shared application state.
pub struct AppState {
    pub collector: DiagnosticCollector,
    /// Basic auth for probe endpoints; `None` leaves them open.
    pub auth: Option<AuthConfig>,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// Body accepted by every probe endpoint.
#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub ip: Option<String>,
    pub community: Option<String>,
}

#[derive(Serialize)]
struct IcmpStatusResponse {
    ip: String,
    status: PingStatus,
}

#[derive(Serialize)]
struct IcmpQosResponse {
    ip: String,
    #[serde(flatten)]
    metrics: PingMetrics,
}

#[derive(Serialize)]
struct SnmpDataResponse {
    ip: String,
    #[serde(flatten)]
    report: SnmpReport,
}

/// Error body: `{"error": "..."}`.
struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<TargetValidationError> for ApiError {
    fn from(e: TargetValidationError) -> Self {
        Self(StatusCode::BAD_REQUEST, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self(StatusCode::BAD_REQUEST, e.body_text())
    }
}

/// Resolve a request body into a validated probe target.
fn resolve_target(
    state: &AppState,
    body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<ProbeTarget, ApiError> {
    let Json(request) = body?;
    let ip = request
        .ip
        .filter(|ip| !ip.trim().is_empty())
        .ok_or(TargetValidationError::EmptyAddress)?;
    let community = request
        .community
        .unwrap_or_else(|| state.collector.default_community().to_string());

    let target = ProbeTarget::new(ip.trim(), community);
    target.validate()?;
    Ok(target)
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let auth = state.auth.clone();
    let app_state = Arc::new(state);

    let mut probes = Router::new()
        .route("/icmp/status", post(icmp_status_handler))
        .route("/icmp/qos", post(icmp_qos_handler))
        .route("/snmp/data", post(snmp_data_handler))
        .route("/diagnostics", post(diagnostics_handler))
        .route("/diagnostics/prompt", post(prompt_handler))
        .with_state(app_state);

    if let Some(creds) = auth {
        probes = probes.route_layer(middleware::from_fn_with_state(
            Arc::new(creds),
            auth::basic_auth_middleware,
        ));
    }

    with_http_layers(
        Router::new()
            .route("/healthz", get(healthz_handler))
            .merge(probes),
    )
}

/// Request tracing and CORS. `Authorization` is marked sensitive before the
/// trace span records headers, so credentials print as `Sensitive`.
fn with_http_layers(router: Router) -> Router {
    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(SetSensitiveRequestHeadersLayer::new([header::AUTHORIZATION]))
        .layer(CorsLayer::permissive())
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn icmp_status_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let target = resolve_target(&state, body)?;
    let metrics = state.collector.ping(&target).await;
    Ok(Json(IcmpStatusResponse {
        ip: target.address,
        status: metrics.status,
    })
    .into_response())
}

async fn icmp_qos_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let target = resolve_target(&state, body)?;
    let metrics = state.collector.ping(&target).await;
    Ok(Json(IcmpQosResponse {
        ip: target.address,
        metrics,
    })
    .into_response())
}

async fn snmp_data_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let target = resolve_target(&state, body)?;
    let report = state.collector.collect_snmp(&target).await;
    Ok(Json(SnmpDataResponse {
        ip: target.address,
        report,
    })
    .into_response())
}

async fn diagnostics_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let target = resolve_target(&state, body)?;
    let snapshot = state.collector.collect_diagnostics(&target).await;
    Ok(Json(snapshot).into_response())
}

async fn prompt_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TargetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let target = resolve_target(&state, body)?;
    let snapshot = state.collector.collect_diagnostics(&target).await;
    let prompt = build_prompt(&snapshot).map_err(|e| {
        tracing::error!(error = %e, "Prompt rendering failed");
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(prompt).into_response())
}
