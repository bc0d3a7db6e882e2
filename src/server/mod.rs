use axum::routing::get;
use axum::{Json, Router};
use log::{info, warn};
use std::sync::Arc;

use crate::error::Result;
use crate::query::QueryService;

pub mod error;
pub mod routes;

pub use error::AppError;

/// Assemble the application router from one query service per dataset.
///
/// Each dataset gets the same route set under its own prefix
/// (`/api/sanctions/*` for OFAC, `/api/eu-sanctions/*` for the EU list).
/// Every response body carries a `success` flag.
pub fn router(services: &[Arc<QueryService>]) -> Router {
    services.iter().fold(
        Router::new().route("/health", get(health)),
        |app, service| app.nest(service.kind().route_prefix(), routes::router(service.clone())),
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

/// Serve `app` on `bind` until Ctrl-C
pub async fn serve(bind: &str, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
