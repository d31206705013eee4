use crate::config::SERVICE_NAME;
use crate::error::ProductError;
use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use service_core::response::ErrorBody;

/// General health report. Does not touch the store.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Products service is running"
    }))
}

/// Ready only when the store answers a ping.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.repository.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "service": SERVICE_NAME,
                "database": "connected",
                "timestamp": Utc::now().to_rfc3339()
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not ready",
                "service": SERVICE_NAME,
                "database": "disconnected",
                "error": store_error_message(e),
                "timestamp": Utc::now().to_rfc3339()
            })),
        ),
    }
}

/// The driver's own message for an unreachable store, without the error prefix.
fn store_error_message(err: ProductError) -> String {
    match err {
        ProductError::StoreUnavailable(message) => message,
        other => other.to_string(),
    }
}

pub async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "status": "alive",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

pub async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::message("Route not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_store_reports_bare_driver_message() {
        assert_eq!(
            store_error_message(ProductError::StoreUnavailable(
                "Server selection timeout".to_string()
            )),
            "Server selection timeout"
        );
    }

    #[test]
    fn other_errors_use_their_display() {
        assert_eq!(
            store_error_message(ProductError::NotFound),
            "Product not found"
        );
    }
}
