use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use autosales_infra::SaleError;
use autosales_sales::ValidationErrors;

pub fn sale_error_to_response(err: SaleError) -> axum::response::Response {
    match err {
        SaleError::InvalidPayload(fields) => validation_error(&fields),
        SaleError::ConfigurationMissing => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "configuration_missing",
            "inventory configuration missing",
        ),
        SaleError::VehicleNotFound => {
            json_error(StatusCode::NOT_FOUND, "vehicle_not_found", "vehicle not found")
        }
        SaleError::VehicleUnavailable => json_error(
            StatusCode::CONFLICT,
            "vehicle_unavailable",
            "vehicle is not available for sale",
        ),
        SaleError::UpstreamUnavailable(detail) => {
            tracing::warn!(error = %detail, "inventory service call failed");
            json_error(
                StatusCode::BAD_GATEWAY,
                "upstream_unavailable",
                "inventory service unavailable",
            )
        }
        SaleError::SaleNotFound => json_error(StatusCode::NOT_FOUND, "sale_not_found", "sale not found"),
        SaleError::AlreadyFinalized(msg) => json_error(StatusCode::CONFLICT, "sale_already_finalized", msg),
        SaleError::Store(e) => {
            tracing::error!(error = %e, "sale store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal error")
        }
    }
}

/// Body could not be read as JSON (syntax, content type, shape).
pub fn invalid_json(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_payload", rejection.body_text())
}

pub fn validation_error(fields: &ValidationErrors) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "invalid_payload",
            "message": "invalid payload",
            "fields": fields.fields(),
        })),
    )
        .into_response()
}

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
