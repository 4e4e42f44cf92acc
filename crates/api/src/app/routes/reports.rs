use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new().route("/daily-batch", post(daily_batch))
}

/// Queue the daily report batch: one commission report per registered
/// seller and one admin report per manager. Normally driven by an external
/// scheduler once a day; defaults to yesterday's business date.
pub async fn daily_batch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<dto::DateQuery>,
) -> axum::response::Response {
    if !caller.role().is_manager() {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "manager role required");
    }

    let mut recipients = services.directory.manager_emails();
    if recipients.is_empty() {
        if let Some(fallback) = &services.admin_report_recipient {
            recipients.push(fallback.clone());
        }
    }

    match services
        .dispatcher
        .enqueue_daily_batch(query.date, &recipients)
        .await
    {
        Ok(queued) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "message": "daily report batch queued",
                "date": queued.date.to_string(),
                "seller_reports": queued.seller_reports,
                "admin_reports": queued.admin_reports,
            })),
        )
            .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}
