use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use salesdesk_auth::Role;
use salesdesk_infra::credentials::DirectoryError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let role = match body.role.as_deref() {
        None => Role::Seller,
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) => role,
            Err(_) => {
                return errors::validation_error("role", "role must be 'manager' or 'seller'")
            }
        },
    };

    let account = match services
        .directory
        .register(&body.name, &body.email, &body.password, role)
    {
        Ok(account) => account,
        Err(e) => return directory_error_to_response(e),
    };

    let token = match services.issue_token(&account) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue token");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            );
        }
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "token": token,
            "user": dto::user_to_json(&account),
        })),
    )
        .into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let account = match services.directory.authenticate(&body.email, &body.password) {
        Ok(account) => account,
        Err(e) => return directory_error_to_response(e),
    };

    let token = match services.issue_token(&account) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue token");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            );
        }
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "user": dto::user_to_json(&account),
        })),
    )
        .into_response()
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    services.directory.revoke_token(caller.token());
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "logged out" })),
    )
        .into_response()
}

pub async fn user(Extension(caller): Extension<CallerContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": caller.user_id().to_string(),
        "name": caller.name(),
        "email": caller.email(),
        "role": caller.role().as_str(),
    }))
}

fn directory_error_to_response(err: DirectoryError) -> axum::response::Response {
    match err {
        DirectoryError::DuplicateEmail => {
            errors::validation_error("email", "email is already registered")
        }
        DirectoryError::InvalidCredentials => errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid email or password",
        ),
        DirectoryError::Invalid { field, message } => errors::validation_error(&field, message),
    }
}
