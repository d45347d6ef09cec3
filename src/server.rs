//! HTTP server assembly and startup.

use std::{any::Any, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn, Level};

use crate::{
    config::{GatewayConfig, API_KEY_ENV},
    logging::{self, LoggingConfig},
    routers::{self, error as router_error},
};

/// Shared per-process state: the immutable configuration and the pooled
/// upstream HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(50)))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

async fn chat_completions(State(state): State<AppState>, body: Bytes) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => return router_error::bad_request(format!("Invalid JSON body: {e}")),
    };

    routers::handle_chat(&state, body).await
}

/// Non-preflight OPTIONS probes get an empty 200; actual CORS preflight
/// is answered by the layer before the request reaches the router.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    router_error::method_not_allowed()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Outermost in-band boundary: a panicking handler still produces a
/// well-formed JSON error response instead of a torn connection.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(panic = %detail, "Request handler panicked");
    router_error::internal_error(detail)
}

/// Assemble the router. CORS wraps every response, error paths included,
/// and the panic boundary sits inside it so even a panic response still
/// carries the CORS headers.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AnyOrigin);

    Router::new()
        .route("/health", get(health))
        .route(
            "/v1/chat/completions",
            post(chat_completions)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn startup(config: GatewayConfig) -> anyhow::Result<()> {
    let _log_guard = logging::init_logging(LoggingConfig {
        level: if config.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        },
        log_dir: config.log_dir.clone(),
        ..LoggingConfig::default()
    });

    config.validate()?;

    if config.api_key.is_none() {
        warn!(
            "{} not set; requests will be rejected until it is configured",
            API_KEY_ENV
        );
    }

    info!(
        host = %config.host,
        port = config.port,
        upstream = %config.upstream_url,
        timeout_secs = config.request_timeout_secs,
        "Initializing gateway"
    );

    let bind_addr = (config.host.clone(), config.port);
    let state = AppState::new(config).map_err(anyhow::Error::msg)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Serving gateway");
    axum::serve(listener, app).await?;

    Ok(())
}
