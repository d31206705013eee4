use super::store::ProductStore;
use crate::dtos::ProductFilter;
use crate::error::ProductError;
use crate::models::{Product, ProductChanges};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store, selected with `STORE_BACKEND=memory`.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    products: Arc<RwLock<HashMap<ObjectId, Product>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(filter: &ProductFilter, product: &Product) -> bool {
    filter
        .category
        .as_deref()
        .map_or(true, |category| product.category == category)
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn find_page(
        &self,
        filter: &ProductFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>, ProductError> {
        let products = self.products.read().await;
        let mut found: Vec<&Product> = products.values().filter(|p| matches(filter, p)).collect();
        // ObjectIds grow monotonically, which orders inserts within one millisecond.
        found.sort_by_key(|p| Reverse((p.created_at, p.id)));

        Ok(found
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, ProductError> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| matches(filter, p)).count() as u64)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Product>, ProductError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(ProductError::Internal(anyhow::anyhow!(
                "duplicate product id {}",
                product.id
            )));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_by_id(
        &self,
        id: ObjectId,
        changes: &ProductChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductError> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(&id).map(|product| {
            changes.apply_to(product, updated_at);
            product.clone()
        }))
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Product>, ProductError> {
        Ok(self.products.write().await.remove(&id))
    }

    async fn ping(&self) -> Result<(), ProductError> {
        Ok(())
    }
}
