//! The REST backend for the Tilak Mitra Mandal expense tracker.
//!
//! Members of the organization record money collected and spent, attach
//! receipt images (stored in a remote image host), and view running totals.
//! This library provides the router, the data models and their SQLite
//! persistence, JWT-based authentication, and the receipt store client.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod auth;
mod collection;
mod config;
mod db;
mod endpoints;
mod error;
mod expense;
mod routing;
mod state;
mod summary;
#[cfg(test)]
mod test_utils;

pub mod models;
pub mod receipts;

pub use auth::{Claims, Credentials, LogInResponse, TOKEN_DURATION, decode_token, encode_token};
pub use config::{CloudinaryConfig, Config, ConfigError, DEFAULT_PORT, SeedAdmin};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use routing::build_router;
pub use state::AppState;
pub use summary::FinancialSummary;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
