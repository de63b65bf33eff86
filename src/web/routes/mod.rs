//! Contains all the routes that this application can handle.

mod api;

// re-export errors
pub use api::subscribe::{SubscribeError, SubscribeResponse, SUBSCRIBE_SUCCESS_MSG};

use crate::AppState;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server.
/// `/` is the subscription form, every other unmatched path is looked up in the static directory.
pub fn routes(app_state: AppState) -> Router {
    let static_dir = app_state.static_dir.clone();

    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest("/api", api_routes(app_state))
        .route("/health-check", get(health_check))
        .fallback_service(ServeDir::new(static_dir))
}

/// API - Routes nested under "/api" path
fn api_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/subscribe", post(api::subscribe))
        .with_state(app_state)
}
