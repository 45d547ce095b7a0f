//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/inventory selection and the shared service bundle
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use autosales_infra::SalesConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from process configuration (used by `main.rs`).
pub async fn build_app(config: &SalesConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services)))
}

/// Router over an already-wired service bundle.
pub fn router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(Extension(services)),
        )
}
