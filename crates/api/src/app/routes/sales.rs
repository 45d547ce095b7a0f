use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_sale))
        .route("/available-vehicles", get(list_available_vehicles))
        .route("/sold-vehicles", get(list_sold_vehicles))
        .route("/payments/webhook", post(payment_webhook))
}

pub async fn list_available_vehicles(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.query.list_available_for_sale().await {
        Ok(vehicles) => (StatusCode::OK, Json(vehicles)).into_response(),
        Err(e) => errors::sale_error_to_response(e),
    }
}

pub async fn list_sold_vehicles(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.query.list_sold().await {
        Ok(sales) => (StatusCode::OK, Json(sales)).into_response(),
        Err(e) => errors::sale_error_to_response(e),
    }
}

pub async fn create_sale(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateSaleRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_json(rejection),
    };

    match services
        .lifecycle
        .create_sale(body.vehicle_id, body.cpf_buyer)
        .await
    {
        Ok(sale) => (StatusCode::CREATED, Json(sale)).into_response(),
        Err(e) => errors::sale_error_to_response(e),
    }
}

pub async fn payment_webhook(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::PaymentWebhookRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_json(rejection),
    };

    match services
        .lifecycle
        .process_payment_webhook(body.payment_code, body.status)
        .await
    {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => errors::sale_error_to_response(e),
    }
}
