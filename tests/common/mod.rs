//! Shared test harness: a scriptable mock upstream provider plus request
//! and body helpers for driving the gateway router in-process.
#![allow(dead_code)]

use std::{
    collections::VecDeque,
    io,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures::{stream, StreamExt};
use http_body_util::BodyExt;
use serde_json::Value;

use cod_gateway::{
    config::GatewayConfig,
    server::{build_app, AppState},
};

/// One scripted reply from the mock provider; replies are consumed in
/// request order.
pub enum MockResponse {
    /// 200 with a JSON body
    Json(Value),
    /// Non-2xx with a plain-text body
    Error(StatusCode, String),
    /// 200 event stream delivering each chunk separately, then EOF
    Stream(Vec<String>),
    /// 200 event stream that aborts the connection after its chunks
    InterruptedStream(Vec<String>),
    /// 200 with an explicitly empty body
    EmptyBody,
}

struct MockState {
    hits: AtomicUsize,
    requests: Mutex<Vec<Value>>,
    script: Mutex<VecDeque<MockResponse>>,
}

/// Mock upstream provider bound to an ephemeral local port.
pub struct MockUpstream {
    addr: SocketAddr,
    state: Arc<MockState>,
    _server: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start(script: Vec<MockResponse>) -> Self {
        let state = Arc::new(MockState {
            hits: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock upstream server error: {}", e);
            }
        });

        Self {
            addr,
            state,
            _server: server,
        }
    }

    pub fn chat_url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    /// Number of requests the provider has received.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Every request body received, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn chat_completions_handler(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(body);

    let next = state.script.lock().unwrap().pop_front();
    match next {
        Some(MockResponse::Json(value)) => (StatusCode::OK, Json(value)).into_response(),
        Some(MockResponse::Error(status, body)) => (status, body).into_response(),
        Some(MockResponse::Stream(chunks)) => stream_response(chunks, false),
        Some(MockResponse::InterruptedStream(chunks)) => stream_response(chunks, true),
        Some(MockResponse::EmptyBody) => StatusCode::OK.into_response(),
        None => (
            StatusCode::OK,
            Json(serde_json::json!({ "choices": [] })),
        )
            .into_response(),
    }
}

/// Event-stream body delivering each chunk as its own frame, spaced out
/// so the gateway observes them as separate reads. When `interrupt` is
/// set the body errors after the last chunk, tearing the connection down
/// before the stream terminates cleanly.
fn stream_response(chunks: Vec<String>, interrupt: bool) -> Response {
    let chunks = stream::iter(
        chunks
            .into_iter()
            .map(|chunk| Ok::<_, io::Error>(Bytes::from(chunk))),
    )
    .then(|item| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        item
    });

    let body = if interrupt {
        let aborted = chunks.chain(stream::once(async {
            Err(io::Error::other("mock upstream interrupt"))
        }));
        Body::from_stream(aborted)
    } else {
        Body::from_stream(chunks)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(body)
        .unwrap()
}

// ============================================================================
// Gateway harness
// ============================================================================

pub fn test_config(upstream_url: String) -> GatewayConfig {
    GatewayConfig {
        upstream_url,
        api_key: Some("test-key".to_string()),
        ..GatewayConfig::default()
    }
}

/// Gateway router wired to the given upstream URL.
pub fn test_app(upstream_url: String) -> Router {
    build_app(AppState::new(test_config(upstream_url)).expect("Failed to build app state"))
}

/// Gateway router with no credential configured.
pub fn test_app_without_api_key() -> Router {
    let config = GatewayConfig {
        api_key: None,
        ..GatewayConfig::default()
    };
    build_app(AppState::new(config).expect("Failed to build app state"))
}

pub fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/v1/chat/completions")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn request_with_method(method: Method) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/v1/chat/completions")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap()
}

pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not JSON")
}

/// Data frames of the response body, one entry per chunk as produced.
pub async fn body_frames(response: Response) -> Vec<Bytes> {
    let mut body = response.into_body();
    let mut frames = Vec::new();
    while let Some(frame) = body.frame().await {
        let frame = frame.expect("Failed to read body frame");
        if let Ok(data) = frame.into_data() {
            frames.push(data);
        }
    }
    frames
}
