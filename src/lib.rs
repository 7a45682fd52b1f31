//! Kassenwart is the treasurer's web app of a student club.
//!
//! Members file reimbursement requests and beverage reports, the treasurer
//! books missing monthly contributions, edits member transactions and
//! updates member titles. All data lives in a separate backend API; this
//! library serves the HTML pages and keeps the half-filled forms in memory.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod backend;
mod beverage;
mod config;
mod date;
mod decimal;
mod endpoints;
mod error;
mod fines;
mod html;
mod internal_server_error;
mod logging;
mod member;
mod members;
mod missing_payments;
mod navigation;
mod not_found;
mod reimbursement;
mod report;
mod routing;
mod rows;
mod store;
mod transactions;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use backend::{BackendClient, HttpTransport, Transport};
pub use config::Config;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use store::DEFAULT_SESSION_CAPACITY;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
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
