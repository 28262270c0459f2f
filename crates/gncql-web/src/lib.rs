//! Read-only HTTP/JSON query service over a loaded GnuCash book.
//!
//! The book is loaded once at startup and shared immutably by every request.
//!
//! | Route | Answer |
//! |-------|--------|
//! | `GET /` | status and load statistics |
//! | `GET /api/root` | the root account |
//! | `GET /api/accounts/:id` | one account, 404 if absent |
//! | `GET /api/accounts?id=&name=&type=` | matching accounts, breadth-first |
//! | `GET /api/accounts/:id/descendants?id=&name=&type=` | matching accounts of a subtree |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use handlers::AppState;

/// Build the service router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/api/root", get(handlers::root_account))
        .route("/api/accounts", get(handlers::accounts))
        .route("/api/accounts/:id", get(handlers::account))
        .route("/api/accounts/:id/descendants", get(handlers::descendants))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
