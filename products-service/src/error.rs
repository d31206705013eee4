use service_core::error::AppError;
use service_core::response::FieldErrors;
use thiserror::Error;

/// Failure categories for product operations. Converting into [`AppError`]
/// is the only place a category is tied to an HTTP status.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Invalid product ID")]
    InvalidId,

    #[error("Product not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Internal(anyhow::Error::new(err))
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::NoFieldsToUpdate | ProductError::InvalidId => {
                AppError::BadRequest(anyhow::anyhow!(err.to_string()))
            }
            ProductError::NotFound => AppError::NotFound(anyhow::anyhow!(err.to_string())),
            ProductError::StoreUnavailable(msg) => AppError::ServiceUnavailable(msg),
            ProductError::Internal(e) => AppError::DatabaseError(e),
        }
    }
}
