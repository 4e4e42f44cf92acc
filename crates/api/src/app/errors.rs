use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use salesdesk_core::DomainError;
use salesdesk_infra::dispatch::DispatchError;
use salesdesk_infra::store::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// `422` carrying the field-level detail the SPA renders next to inputs.
pub fn validation_error(field: &str, message: impl Into<String>) -> axum::response::Response {
    let message = message.into();
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        axum::Json(json!({
            "error": "validation_error",
            "message": format!("{field}: {message}"),
            "errors": { field: [message] },
        })),
    )
        .into_response()
}

pub fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation { field, message } => validation_error(&field, message),
        DomainError::InvalidId(_) => not_found(),
        DomainError::NotFound => not_found(),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => not_found(),
        StoreError::DuplicateEmail => validation_error("email", "email is already registered"),
        StoreError::SellerHasSales => json_error(
            StatusCode::CONFLICT,
            "conflict",
            "seller still has sales; delete or reassign them first",
        ),
        StoreError::UnknownSeller => validation_error("seller_id", "seller does not exist"),
        StoreError::Backend(detail) => {
            tracing::error!(%detail, "storage backend failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}

pub fn dispatch_error_to_response(err: DispatchError) -> axum::response::Response {
    match err {
        DispatchError::SellerNotFound => not_found(),
        DispatchError::Store(e) => store_error_to_response(e),
        other => {
            tracing::error!(error = %other, "report dispatch failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}
