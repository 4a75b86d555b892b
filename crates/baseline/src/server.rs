//! HTTP server for analysis requests
//!
//! Routes:
//! - `POST /api/analyze`: analyze one CSS or JavaScript source
//! - `POST /api/analyze-repo`: scan a GitHub repository (rate limited per client)
//! - `GET /api/health`: liveness check

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use baseline_api::{AnalyzeRepoRequest, AnalyzeRequest, ApiErrorBody, HealthResponse};
use baseline_core::{Analyzer, Language};
use eyre::{Result, WrapErr};
use facet_axum::Json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::rate_limit::{Decision, FixedWindowLimiter};
use crate::scanner::{RepositoryScanner, ScanError};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// State shared across HTTP handlers
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub scanner: RepositoryScanner,
    pub limiter: FixedWindowLimiter,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, scanner: RepositoryScanner) -> Self {
        Self {
            analyzer,
            scanner,
            limiter: FixedWindowLimiter::new(),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/analyze", post(api_analyze))
        .route("/api/analyze-repo", post(api_analyze_repo))
        .route("/api/health", get(api_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Serve on an already-bound listener until the process exits
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    // Expired windows are dropped once per window length
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(state.limiter.window());
            interval.tick().await;
            loop {
                interval.tick().await;
                state.limiter.sweep();
            }
        });
    }

    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .wrap_err("HTTP server failed")?;

    Ok(())
}

/// Run the server described by `config`
pub async fn run(config: &Config, port: Option<u16>) -> Result<()> {
    let analyzer = Arc::new(crate::analyzer(config)?);
    let scanner = crate::github_scanner(config, Arc::clone(&analyzer))?;
    let state = Arc::new(AppState::new(analyzer, scanner));

    let addr = format!("0.0.0.0:{}", port.unwrap_or_else(|| config.port()));
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;

    info!("baseline listening on http://{}", listener.local_addr()?);

    serve(listener, state).await
}

/// API error responses (always JSON)
struct ApiError;

impl ApiError {
    fn response(status: StatusCode, code: &str, msg: impl Into<String>) -> Response {
        (
            status,
            Json(ApiErrorBody {
                error: msg.into(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }

    fn validation(msg: impl std::fmt::Display) -> Response {
        Self::response(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("Invalid request: {}", msg),
        )
    }

    fn rate_limited(retry_after_secs: u64) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::RETRY_AFTER, retry_after_secs.into());
        (
            headers,
            Self::response(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Rate limit exceeded. Please try again in a minute.",
            ),
        )
            .into_response()
    }

    fn from_scan(err: &ScanError) -> Response {
        match err {
            ScanError::RepositoryNotFound(_) => Self::response(
                StatusCode::NOT_FOUND,
                "not_found",
                "Repository not found. Please check the owner and repo name.",
            ),
            ScanError::AccessDenied(repository) => Self::response(
                StatusCode::FORBIDDEN,
                "access_denied",
                format!("Access to {} was denied.", repository),
            ),
            ScanError::Upstream(msg) => {
                Self::response(StatusCode::BAD_GATEWAY, "upstream_error", msg.clone())
            }
        }
    }
}

fn body_text(body: &[u8]) -> Result<&str, Response> {
    std::str::from_utf8(body).map_err(ApiError::validation)
}

/// Whether `name` can be a GitHub owner or repository name
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && name != "."
        && name != ".."
}

/// Rate limiting key for a request
fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// POST /api/analyze - Analyze one source
async fn api_analyze(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match body_text(&body).and_then(|text| {
        facet_json::from_str::<AnalyzeRequest>(text).map_err(ApiError::validation)
    }) {
        Ok(request) => request,
        Err(e) => return e,
    };

    let Some(language) = Language::parse(&request.language) else {
        return ApiError::validation(format!(
            "unsupported language '{}', expected css, js or javascript",
            request.language
        ));
    };

    debug!("Analyzing {} bytes of {}", request.code.len(), language);
    Json(state.analyzer.analyze(&request.code, language)).into_response()
}

/// POST /api/analyze-repo - Scan a GitHub repository
async fn api_analyze_repo(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let key = client_key(&request);
    if let Decision::Denied { retry_after } = state.limiter.check(&key) {
        warn!("Rate limit exceeded for {}", key);
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        return ApiError::rate_limited(secs.max(1));
    }

    let body = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => return ApiError::validation(e),
    };
    let request = match body_text(&body).and_then(|text| {
        facet_json::from_str::<AnalyzeRepoRequest>(text).map_err(ApiError::validation)
    }) {
        Ok(request) => request,
        Err(e) => return e,
    };

    if !is_valid_name(&request.owner) || !is_valid_name(&request.repo) {
        return ApiError::validation("owner and repo must be GitHub account and repository names");
    }

    match state.scanner.scan(&request.owner, &request.repo).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            warn!("Scan of {}/{} failed: {}", request.owner, request.repo, e);
            ApiError::from_scan(&e)
        }
    }
}

/// GET /api/health - Liveness check
async fn api_health() -> Response {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
    .into_response()
}
