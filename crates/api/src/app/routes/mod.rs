use axum::Router;

pub mod sales;
pub mod system;

/// Router for all business endpoints.
pub fn router() -> Router {
    Router::new().nest("/sales", sales::router())
}
