use crate::dtos::{validate_changes, validate_new_product, ListParams, ProductResponse};
use crate::error::ProductError;
use crate::startup::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use service_core::error::AppError;
use service_core::response::{ApiResponse, Pagination};

/// Logs unexpected failures with the operation that hit them; expected
/// outcomes (bad id, not found, validation) pass through quietly.
fn failure(action: &'static str) -> impl Fn(ProductError) -> AppError {
    move |err| {
        if let ProductError::Internal(cause) = &err {
            tracing::error!(error = %format!("{:#}", cause), "{}", action);
        }
        AppError::from(err)
    }
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        AppError::BadRequest(anyhow::anyhow!("Invalid JSON payload: {}", rejection.body_text()))
    })
}

#[tracing::instrument(skip(state, params))]
pub async fn list_products(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|rejection| {
        AppError::BadRequest(anyhow::anyhow!("Invalid query: {}", rejection.body_text()))
    })?;
    let page = params.page_request()?;
    let filter = params.filter();

    let (products, total) = state
        .repository
        .list(&filter, page)
        .await
        .map_err(failure("Failed to fetch products"))?;

    let data: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();

    Ok(Json(ApiResponse::paginated(
        data,
        Pagination::new(page.page, page.limit, total),
    )))
}

#[tracing::instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .repository
        .get_by_id(&id)
        .await
        .map_err(failure("Failed to fetch product"))?;

    Ok(Json(ApiResponse::ok(ProductResponse::from(product))))
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let fields = validate_new_product(&json_body(payload)?)?;

    let product = state
        .repository
        .create(fields)
        .await
        .map_err(failure("Failed to create product"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ProductResponse::from(product))),
    ))
}

#[tracing::instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let changes = validate_changes(&json_body(payload)?)?;

    let product = state
        .repository
        .update(&id, changes)
        .await
        .map_err(failure("Failed to update product"))?;

    Ok(Json(ApiResponse::ok(ProductResponse::from(product))))
}

#[tracing::instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .repository
        .delete(&id)
        .await
        .map_err(failure("Failed to delete product"))?;

    Ok(Json(
        ApiResponse::ok(ProductResponse::from(product)).with_message("Product deleted successfully"),
    ))
}
