//! HTTP API
//!
//! - `GET /api/up/update` pulls new transactions from Up Bank and answers
//!   with the number added
//! - `GET /api/up/transactions?skip=&take=` answers with one page of
//!   stored transactions
//!
//! Service calls block on DuckDB and the Up API, so they run on the
//! blocking pool.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use upflow_core::{Empty, PagedResult, TransactionDto, UpflowContext};

/// Body of every 500 response; details only go to the log
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error has occured.";

const DEFAULT_SKIP: i64 = 0;
const DEFAULT_TAKE: i64 = 20;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    ctx: Arc<UpflowContext>,
}

impl AppState {
    pub fn new(ctx: UpflowContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }
}

/// Any failure that escapes a handler
pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "An internal server error has occured");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_skip")]
    skip: i64,
    #[serde(default = "default_take")]
    take: i64,
}

fn default_skip() -> i64 {
    DEFAULT_SKIP
}

fn default_take() -> i64 {
    DEFAULT_TAKE
}

/// Build the router with CORS for the given origins
pub fn app_router(state: AppState, cors_origins: &[String]) -> anyhow::Result<Router> {
    let origins = cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Ok(Router::new()
        .route("/api/up/update", get(update))
        .route("/api/up/transactions", get(transactions))
        .layer(cors)
        .with_state(state))
}

async fn update(State(state): State<AppState>) -> Result<Json<PagedResult<Empty>>, ApiError> {
    let ctx = state.ctx.clone();
    let result = tokio::task::spawn_blocking(move || ctx.sync_service()?.synchronize()).await??;
    Ok(Json(result.into()))
}

async fn transactions(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PagedResult<TransactionDto>>, ApiError> {
    let ctx = state.ctx.clone();
    let page =
        tokio::task::spawn_blocking(move || ctx.query_service.list_page(params.skip, params.take))
            .await??;
    Ok(Json(page))
}
