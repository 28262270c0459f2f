//! Request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use gncql_core::AccountFilter;
use gncql_loader::Database;

use crate::models::{AccountDetail, AccountSummary, ErrorResponse, StatusResponse};

/// Shared application state
pub struct AppState {
    /// The loaded book, immutable for the lifetime of the process.
    pub database: Database,
    /// Version reported by the status endpoint.
    pub version: &'static str,
}

impl AppState {
    /// Serve `database`.
    pub fn new(database: Database) -> Self {
        Self {
            database,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Errors returned to API clients as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// No account with this ID.
    AccountNotFound(String),
    /// No route for this path.
    RouteNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::AccountNotFound(id) => (StatusCode::NOT_FOUND, format!("account '{id}' not found")),
            Self::RouteNotFound(path) => (StatusCode::NOT_FOUND, format!("no route for '{path}'")),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Service status and load statistics
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse::new(state.version, &state.database))
}

/// The root account
pub async fn root_account(State(state): State<Arc<AppState>>) -> Json<AccountDetail> {
    let db = &state.database;
    Json(AccountDetail::new(db.tree(), db.root_account()))
}

/// A single account by ID
pub async fn account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AccountDetail>, ApiError> {
    let db = &state.database;
    let account = db.account(&id).ok_or(ApiError::AccountNotFound(id))?;
    Ok(Json(AccountDetail::new(db.tree(), account)))
}

/// Accounts matching the query filter, breadth-first from the root
pub async fn accounts(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AccountFilter>,
) -> Json<Vec<AccountSummary>> {
    let db = &state.database;
    tracing::debug!(?filter, "accounts query");
    Json(
        db.accounts(&filter)
            .into_iter()
            .map(|account| AccountSummary::new(db.tree(), account))
            .collect(),
    )
}

/// Accounts of a subtree matching the query filter
pub async fn descendants(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(filter): Query<AccountFilter>,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    let db = &state.database;
    let start = db.account(&id).ok_or(ApiError::AccountNotFound(id))?;
    tracing::debug!(start = %start.id, ?filter, "descendants query");
    Ok(Json(
        db.descendants(start, &filter)
            .into_iter()
            .map(|account| AccountSummary::new(db.tree(), account))
            .collect(),
    ))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    tracing::info!("no route for {uri}");
    ApiError::RouteNotFound(uri.path().to_string())
}
