use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;

use salesdesk_core::{Page, PageRequest, SaleId, SellerId};
use salesdesk_sales::{NewSale, SaleFilter, SalePatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/daily-summary", get(daily_summary))
        .route("/:id", get(get_sale).put(update_sale).delete(delete_sale))
}

pub async fn list_sales(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SaleListQuery>,
) -> axum::response::Response {
    let seller_id = match &query.seller_id {
        None => None,
        Some(raw) => match raw.parse::<SellerId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::validation_error("seller_id", "seller_id must be a valid id")
            }
        },
    };

    let filter = SaleFilter {
        seller_id,
        date_from: query.date_from,
        date_to: query.date_to,
        amount_min: query.amount_min,
        amount_max: query.amount_max,
    };
    let sales = match services.store.list_sales(&filter).await {
        Ok(sales) => sales,
        Err(e) => return errors::store_error_to_response(e),
    };

    let page = Page::slice(sales, PageRequest::new(query.page, query.per_page));
    (StatusCode::OK, Json(dto::page_to_json(page, dto::sale_to_json))).into_response()
}

pub async fn create_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateSaleRequest>,
) -> axum::response::Response {
    let seller_id = match body.seller_id.parse::<SellerId>() {
        Ok(id) => id,
        Err(_) => return errors::validation_error("seller_id", "seller_id must be a valid id"),
    };
    let Some(amount) = body.amount.to_decimal() else {
        return errors::validation_error("amount", "amount must be a decimal number");
    };

    let new = match NewSale::new(seller_id, amount, body.sale_date, services.today()) {
        Ok(new) => new,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let sale = new.into_sale(Utc::now());
    if let Err(e) = services.store.insert_sale(sale.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::sale_to_json(&sale))).into_response()
}

pub async fn get_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let sale_id = match parse_sale_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.sale(sale_id).await {
        Ok(Some(sale)) => (StatusCode::OK, Json(dto::sale_to_json(&sale))).into_response(),
        Ok(None) => errors::not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateSaleRequest>,
) -> axum::response::Response {
    let sale_id = match parse_sale_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut sale = match services.store.sale(sale_id).await {
        Ok(Some(sale)) => sale,
        Ok(None) => return errors::not_found(),
        Err(e) => return errors::store_error_to_response(e),
    };

    let seller_id = match &body.seller_id {
        None => None,
        Some(raw) => match raw.parse::<SellerId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::validation_error("seller_id", "seller_id must be a valid id")
            }
        },
    };
    let amount: Option<Decimal> = match &body.amount {
        None => None,
        Some(input) => match input.to_decimal() {
            Some(amount) => Some(amount),
            None => return errors::validation_error("amount", "amount must be a decimal number"),
        },
    };

    let patch = SalePatch {
        seller_id,
        amount,
        sale_date: body.sale_date,
    };
    if let Err(e) = patch.apply(&mut sale, services.today(), Utc::now()) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.store.update_sale(sale.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::sale_to_json(&sale))).into_response()
}

pub async fn delete_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let sale_id = match parse_sale_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.delete_sale(sale_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn daily_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::DateQuery>,
) -> axum::response::Response {
    let date = query.date.unwrap_or_else(|| services.today());

    let filter = SaleFilter {
        date_from: Some(date),
        date_to: Some(date),
        ..Default::default()
    };
    let sales = match services.store.list_sales(&filter).await {
        Ok(sales) => sales,
        Err(e) => return errors::store_error_to_response(e),
    };
    let sellers = match services.store.search_sellers(None).await {
        Ok(sellers) => sellers,
        Err(e) => return errors::store_error_to_response(e),
    };

    let summary = salesdesk_reporting::daily_summary(date, &sales, &sellers);
    (StatusCode::OK, Json(dto::daily_summary_to_json(&summary))).into_response()
}

fn parse_sale_id(raw: &str) -> Result<SaleId, axum::response::Response> {
    raw.parse().map_err(|_| errors::not_found())
}
