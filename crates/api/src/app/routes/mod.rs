use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod dashboard;
pub mod reports;
pub mod sales;
pub mod sellers;
pub mod system;

/// Router for all bearer-protected endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::user))
        .nest("/sellers", sellers::router())
        .nest("/sales", sales::router())
        .nest("/dashboard", dashboard::router())
        .nest("/reports", reports::router())
}
