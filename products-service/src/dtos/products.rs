use crate::models::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Raw query string of `GET /products`. Values are kept as text so that
/// non-numeric input can be reported inside the response envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
}

impl ListParams {
    pub fn page_request(&self) -> Result<PageRequest, AppError> {
        Ok(PageRequest {
            page: parse_positive("page", self.page.as_deref(), DEFAULT_PAGE)?,
            limit: parse_positive("limit", self.limit.as_deref(), DEFAULT_LIMIT)?,
        })
    }

    /// An empty `category` means no filter.
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone().filter(|c| !c.is_empty()),
        }
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> Result<u64, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid '{}' parameter: must be a positive integer",
            name
        ))),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_hex(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}
