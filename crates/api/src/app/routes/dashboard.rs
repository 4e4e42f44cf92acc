use std::sync::Arc;

use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};

use salesdesk_reporting::dashboard_stats;
use salesdesk_sales::SaleFilter;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/stats", get(stats))
}

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let total_sellers = match services.store.seller_count().await {
        Ok(count) => count,
        Err(e) => return errors::store_error_to_response(e),
    };
    let sales = match services.store.list_sales(&SaleFilter::default()).await {
        Ok(sales) => sales,
        Err(e) => return errors::store_error_to_response(e),
    };

    let stats = dashboard_stats(services.today(), total_sellers, &sales);
    (StatusCode::OK, Json(dto::dashboard_to_json(&stats))).into_response()
}
