//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (stores, job queue, mail, dispatcher)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: ApiConfig) -> Router {
    let services = Arc::new(services::build_services(&config).await);

    let auth_state = middleware::AuthState {
        verifier: services.codec.clone(),
        directory: services.directory.clone(),
    };

    // Protected routes: require a live (unrevoked) bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/login", post(routes::auth::login))
        .route("/register", post(routes::auth::register))
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
