use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use salesdesk_core::{Page, PageRequest, SellerId};
use salesdesk_sales::SaleFilter;
use salesdesk_sellers::{NewSeller, SellerPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sellers).post(create_seller))
        .route(
            "/:id",
            get(get_seller).put(update_seller).delete(delete_seller),
        )
        .route("/:id/sales", get(seller_sales))
        .route("/:id/resend-commission", post(resend_commission))
}

pub async fn list_sellers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SellerListQuery>,
) -> axum::response::Response {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let sellers = match services.store.search_sellers(search).await {
        Ok(sellers) => sellers,
        Err(e) => return errors::store_error_to_response(e),
    };
    let totals = match services.store.seller_totals().await {
        Ok(totals) => totals,
        Err(e) => return errors::store_error_to_response(e),
    };
    let totals: HashMap<SellerId, _> = totals.into_iter().map(|t| (t.seller_id, t)).collect();

    let page = Page::slice(sellers, PageRequest::new(query.page, query.per_page));
    let body = dto::page_to_json(page, |s| dto::seller_to_json(s, totals.get(&s.id)));
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn create_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateSellerRequest>,
) -> axum::response::Response {
    let new = match NewSeller::new(&body.name, &body.email) {
        Ok(new) => new,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let seller = new.into_seller(Utc::now());
    if let Err(e) = services.store.insert_seller(seller.clone()).await {
        return errors::store_error_to_response(e);
    }

    (
        StatusCode::CREATED,
        Json(dto::seller_to_json(&seller, None)),
    )
        .into_response()
}

pub async fn get_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let seller_id = match parse_seller_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.seller(seller_id).await {
        Ok(Some(seller)) => (StatusCode::OK, Json(dto::seller_to_json(&seller, None))).into_response(),
        Ok(None) => errors::not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateSellerRequest>,
) -> axum::response::Response {
    let seller_id = match parse_seller_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut seller = match services.store.seller(seller_id).await {
        Ok(Some(seller)) => seller,
        Ok(None) => return errors::not_found(),
        Err(e) => return errors::store_error_to_response(e),
    };

    let patch = SellerPatch {
        name: body.name,
        email: body.email,
    };
    if let Err(e) = patch.apply(&mut seller, Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.store.update_seller(seller.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::seller_to_json(&seller, None))).into_response()
}

pub async fn delete_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let seller_id = match parse_seller_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.delete_seller(seller_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn seller_sales(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::SellerSalesQuery>,
) -> axum::response::Response {
    let seller_id = match parse_seller_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.seller(seller_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::not_found(),
        Err(e) => return errors::store_error_to_response(e),
    }

    let filter = SaleFilter {
        seller_id: Some(seller_id),
        date_from: query.date_from,
        date_to: query.date_to,
        ..Default::default()
    };
    let sales = match services.store.list_sales(&filter).await {
        Ok(sales) => sales,
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "data": sales.iter().map(dto::sale_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

pub async fn resend_commission(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::DateQuery>,
) -> axum::response::Response {
    let seller_id = match parse_seller_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let seller = match services.store.seller(seller_id).await {
        Ok(Some(seller)) => seller,
        Ok(None) => return errors::not_found(),
        Err(e) => return errors::store_error_to_response(e),
    };

    match services
        .dispatcher
        .enqueue_seller_report(seller_id, query.date)
        .await
    {
        Ok((_job_id, date)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "commission report queued",
                "seller": dto::seller_to_json(&seller, None),
                "date": date.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::dispatch_error_to_response(e),
    }
}

fn parse_seller_id(raw: &str) -> Result<SellerId, axum::response::Response> {
    // Malformed ids look the same as unknown ids to callers.
    raw.parse().map_err(|_| errors::not_found())
}
