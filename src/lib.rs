pub mod app;
pub mod config;
pub mod database;
mod error;
pub mod utils;
pub mod web;

pub use app::{App, AppState};
pub use error::{Error, Result};
pub use web::serve;

use tracing_subscriber::EnvFilter;

/// Human readable, compact logs for local development. `RUST_LOG` overrides the `debug` default.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .compact()
        .init();
}

/// JSON logs with the current span attached. `RUST_LOG` overrides the `info` default.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
