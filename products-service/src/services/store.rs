use crate::dtos::ProductFilter;
use crate::error::ProductError;
use crate::models::{Product, ProductChanges};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

/// Collection-level operations on stored products.
///
/// Implementations only ever see well-formed identifiers; parsing happens in
/// [`super::ProductRepository`] before any call reaches the store.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Matching products ordered by `created_at` descending.
    async fn find_page(
        &self,
        filter: &ProductFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>, ProductError>;

    async fn count(&self, filter: &ProductFilter) -> Result<u64, ProductError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Product>, ProductError>;

    async fn insert(&self, product: &Product) -> Result<(), ProductError>;

    /// Applies `changes` and returns the document as it is after the update.
    async fn update_by_id(
        &self,
        id: ObjectId,
        changes: &ProductChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductError>;

    /// Removes the document in a single atomic step and returns its last state.
    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Product>, ProductError>;

    /// Reachability check. Failures are reported as
    /// [`ProductError::StoreUnavailable`].
    async fn ping(&self) -> Result<(), ProductError>;
}
