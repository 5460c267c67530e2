//! REST API for HashLedger nodes
//!
//! One router per node variant. Every router shares the same error mapping,
//! request logging and CORS policy, and serves a `/health` probe.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::blockchain::{BlockView, PeerBlock, StakeBlock, WorkBlock};
use crate::error::ChainError;
use crate::node::{PeerNode, StakeNode, WorkNode};

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BlockchainError(ChainError),
    InvalidInput(String),
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BlockchainError(ChainError::InvalidPayload(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BlockchainError(e @ (ChainError::InvalidStake(_) | ChainError::NoEligibleValidator)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::BlockchainError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::BlockchainError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(reason = %rejection.body_text(), "Rejected request body");
        ApiError::InvalidInput("invalid payload".to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct MineRequest {
    #[serde(default)]
    pub data: String,
    /// Out-of-range values fall back to the default difficulty.
    #[serde(default)]
    pub difficulty: i64,
}

#[derive(Deserialize)]
pub struct DataRequest {
    #[serde(default)]
    pub data: String,
}

#[derive(Deserialize)]
pub struct StakeRequest {
    #[serde(default)]
    pub validator: String,
    #[serde(default)]
    pub amount: u64,
}

#[derive(Serialize)]
pub struct StakeResponse {
    pub validator: String,
    pub total: u64,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

fn with_common_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![http::Method::GET, http::Method::POST, http::Method::OPTIONS])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    router
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
}

// ============================================================================
// Routers
// ============================================================================

pub fn build_work_router(node: WorkNode) -> Router {
    let routes = Router::new()
        .route("/chain", get(work_chain))
        .route("/mine", post(work_mine))
        .route("/info", get(work_info))
        .with_state(node);
    with_common_layers(routes)
}

pub fn build_stake_router(node: StakeNode) -> Router {
    let routes = Router::new()
        .route("/chain", get(stake_chain))
        .route("/stake", post(stake_deposit))
        .route("/forge", post(stake_forge))
        .route("/validators", get(stake_validators))
        .route("/info", get(stake_info))
        .with_state(node);
    with_common_layers(routes)
}

pub fn build_peer_router(node: PeerNode) -> Router {
    let routes = Router::new()
        .route("/chain", get(peer_chain))
        .route("/push", post(peer_push))
        .route("/info", get(peer_info))
        .route("/peers", get(peer_list))
        .route("/sync/status", get(peer_sync_status))
        .with_state(node);
    with_common_layers(routes)
}

// ============================================================================
// API Server
// ============================================================================

/// Serves `app` on `0.0.0.0:port` until Ctrl-C.
pub async fn run_api_server(app: Router, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Could not listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn work_chain(State(node): State<WorkNode>) -> impl IntoResponse {
    Json(node.list_chain().await)
}

async fn work_mine(
    State(node): State<WorkNode>,
    payload: Result<Json<MineRequest>, JsonRejection>,
) -> ApiResult<BlockView<WorkBlock>> {
    let Json(req) = payload?;
    let block = node.mine(&req.data, req.difficulty).await?;
    Ok(Json(BlockView::new(block)))
}

async fn work_info(State(node): State<WorkNode>) -> impl IntoResponse {
    Json(node.info().await)
}

async fn stake_chain(State(node): State<StakeNode>) -> impl IntoResponse {
    Json(node.list_chain().await)
}

async fn stake_deposit(
    State(node): State<StakeNode>,
    payload: Result<Json<StakeRequest>, JsonRejection>,
) -> ApiResult<StakeResponse> {
    let Json(req) = payload?;
    let total = node.deposit_stake(&req.validator, req.amount).await?;
    Ok(Json(StakeResponse {
        validator: req.validator.trim().to_string(),
        total,
    }))
}

async fn stake_forge(
    State(node): State<StakeNode>,
    payload: Result<Json<DataRequest>, JsonRejection>,
) -> ApiResult<BlockView<StakeBlock>> {
    let Json(req) = payload?;
    let block = node.forge(&req.data).await?;
    Ok(Json(BlockView::new(block)))
}

async fn stake_validators(State(node): State<StakeNode>) -> impl IntoResponse {
    Json(node.list_validators().await)
}

async fn stake_info(State(node): State<StakeNode>) -> impl IntoResponse {
    Json(node.info().await)
}

async fn peer_chain(State(node): State<PeerNode>) -> impl IntoResponse {
    Json(node.list_chain().await)
}

async fn peer_push(
    State(node): State<PeerNode>,
    payload: Result<Json<DataRequest>, JsonRejection>,
) -> ApiResult<BlockView<PeerBlock>> {
    let Json(req) = payload?;
    let block = node.push(&req.data).await?;
    Ok(Json(BlockView::new(block)))
}

async fn peer_info(State(node): State<PeerNode>) -> impl IntoResponse {
    Json(node.info().await)
}

async fn peer_list(State(node): State<PeerNode>) -> impl IntoResponse {
    Json(node.peers())
}

async fn peer_sync_status(State(node): State<PeerNode>) -> impl IntoResponse {
    Json(node.sync_status().await)
}
