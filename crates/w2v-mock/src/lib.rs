//! Stand-in word-vector service (`/convert/` + health + metrics)

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use prometheus::IntCounter;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const DEFAULT_DIM: usize = 100;
/// The real service only accepts bodies smaller than 16kb.
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024;

static CONVERT_TOTAL: Lazy<IntCounter> = Lazy::new(|| prometheus::register_int_counter!("w2v_mock_convert_requests_total", "Requests served by /convert").unwrap());
static CONVERT_WORDS: Lazy<IntCounter> = Lazy::new(|| prometheus::register_int_counter!("w2v_mock_convert_words_total", "Words received by /convert").unwrap());

/// What `/convert/` answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `{"words": [[f32; dim], ...]}`, one deterministic vector per word.
    Vectors { dim: usize },
    Json(Value),
    /// Arbitrary status and body, for exercising client error paths.
    Raw { status: u16, body: String },
}

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub reply: Reply,
    pub body_limit: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self { reply: Reply::Vectors { dim: DEFAULT_DIM }, body_limit: DEFAULT_BODY_LIMIT }
    }
}

#[derive(Clone)]
pub struct MockService {
    inner: Arc<Inner>,
}

struct Inner {
    config: MockConfig,
    requests: Mutex<Vec<Vec<String>>>,
}

impl Default for MockService {
    fn default() -> Self { Self::new(MockConfig::default()) }
}

impl MockService {
    pub fn new(config: MockConfig) -> Self {
        Self { inner: Arc::new(Inner { config, requests: Mutex::new(Vec::new()) }) }
    }

    pub fn with_reply(reply: Reply) -> Self {
        Self::new(MockConfig { reply, ..MockConfig::default() })
    }

    /// Payloads received by `/convert/`, in arrival order.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.inner.requests.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.requests.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    fn record(&self, words: Vec<String>) {
        self.inner.requests.lock().unwrap_or_else(|p| p.into_inner()).push(words);
    }
}

#[derive(serde::Deserialize)]
struct ConvertPayload {
    words: Vec<String>,
}

#[derive(serde::Serialize)]
struct ConvertResponse {
    words: Vec<Vec<f32>>,
}

pub fn app(service: MockService) -> Router {
    w2v_obs::init();
    let _ = &*CONVERT_TOTAL;
    let _ = &*CONVERT_WORDS;
    let body_limit = service.inner.config.body_limit;

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/metrics", get(metrics))
        .route("/convert", get(convert).post(convert))
        .route("/convert/", get(convert).post(convert))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

async fn metrics() -> impl IntoResponse {
    let (content_type, body) = w2v_obs::gather_text();
    ([("content-type", content_type)], body)
}

async fn convert(State(service): State<MockService>, Json(payload): Json<ConvertPayload>) -> Response {
    CONVERT_TOTAL.inc();
    CONVERT_WORDS.inc_by(payload.words.len() as u64);
    tracing::debug!(target: "mock", words = payload.words.len(), "convert request");

    let reply = match &service.inner.config.reply {
        Reply::Vectors { dim } => {
            let words = payload.words.iter().map(|w| vector_for(w, *dim)).collect();
            Json(ConvertResponse { words }).into_response()
        }
        Reply::Json(value) => Json(value.clone()).into_response(),
        Reply::Raw { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body.clone()).into_response()
        }
    };
    service.record(payload.words);
    reply
}

/// Same word, same vector, within a build.
pub fn vector_for(word: &str, dim: usize) -> Vec<f32> {
    let mut hasher = DefaultHasher::new();
    word.hash(&mut hasher);
    let mut rng = StdRng::seed_from_u64(hasher.finish());
    (0..dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
}

/// Binds `addr` and serves in the background. Port 0 picks a free port.
pub async fn spawn(addr: SocketAddr, service: MockService) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = app(service);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(target: "mock", error = %e, "mock service stopped");
        }
    });
    Ok((local, handle))
}

/// Serves on `addr` until `shutdown` resolves.
pub async fn serve_until<F>(addr: SocketAddr, service: MockService, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(target: "mock", "listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(service))
        .with_graceful_shutdown(shutdown)
        .await
}
