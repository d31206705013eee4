use super::store::ProductStore;
use crate::dtos::{PageRequest, ProductFilter};
use crate::error::ProductError;
use crate::models::{product, NewProduct, Product, ProductChanges};
use metrics::counter;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

/// Product operations over a [`ProductStore`]. The only component that
/// writes product records.
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn ProductStore>,
}

/// Parses an externally supplied identifier (24 hex characters).
pub fn parse_product_id(id: &str) -> Result<ObjectId, ProductError> {
    ObjectId::parse_str(id).map_err(|_| ProductError::InvalidId)
}

impl ProductRepository {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// One page of matching products, newest first, plus the unpaged total.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), ProductError> {
        let products = self
            .store
            .find_page(filter, page.skip(), page.limit)
            .await?;
        let total = self.store.count(filter).await?;
        Ok((products, total))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Product, ProductError> {
        let id = parse_product_id(id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    pub async fn create(&self, fields: NewProduct) -> Result<Product, ProductError> {
        let product = Product::new(fields);
        self.store.insert(&product).await?;
        counter!("products_created_total").increment(1);
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    pub async fn update(&self, id: &str, changes: ProductChanges) -> Result<Product, ProductError> {
        let id = parse_product_id(id)?;
        if changes.is_empty() {
            return Err(ProductError::NoFieldsToUpdate);
        }
        let updated = self
            .store
            .update_by_id(id, &changes, product::now())
            .await?
            .ok_or(ProductError::NotFound)?;
        counter!("products_updated_total").increment(1);
        tracing::info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<Product, ProductError> {
        let id = parse_product_id(id)?;
        let deleted = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)?;
        counter!("products_deleted_total").increment(1);
        tracing::info!(product_id = %id, "Product deleted");
        Ok(deleted)
    }

    pub async fn ping(&self) -> Result<(), ProductError> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Delegates to an in-memory store and counts every call that reaches it.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ProductStore for CountingStore {
        async fn find_page(
            &self,
            filter: &ProductFilter,
            skip: u64,
            limit: u64,
        ) -> Result<Vec<Product>, ProductError> {
            self.hit();
            self.inner.find_page(filter, skip, limit).await
        }

        async fn count(&self, filter: &ProductFilter) -> Result<u64, ProductError> {
            self.hit();
            self.inner.count(filter).await
        }

        async fn find_by_id(&self, id: ObjectId) -> Result<Option<Product>, ProductError> {
            self.hit();
            self.inner.find_by_id(id).await
        }

        async fn insert(&self, product: &Product) -> Result<(), ProductError> {
            self.hit();
            self.inner.insert(product).await
        }

        async fn update_by_id(
            &self,
            id: ObjectId,
            changes: &ProductChanges,
            updated_at: DateTime<Utc>,
        ) -> Result<Option<Product>, ProductError> {
            self.hit();
            self.inner.update_by_id(id, changes, updated_at).await
        }

        async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Product>, ProductError> {
            self.hit();
            self.inner.delete_by_id(id).await
        }

        async fn ping(&self) -> Result<(), ProductError> {
            self.hit();
            self.inner.ping().await
        }
    }

    fn repository() -> (ProductRepository, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        (ProductRepository::new(store.clone()), store)
    }

    fn new_product(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: 9.99,
            category: category.to_string(),
            stock: 1,
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_record() {
        let (repo, _) = repository();
        let created = repo.create(new_product("Mug", "Kitchen")).await.unwrap();
        let fetched = repo.get_by_id(&created.id.to_hex()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_the_store() {
        let (repo, store) = repository();
        for id in ["", "123", "not-an-id", "zzzzzzzzzzzzzzzzzzzzzzzz", "507f1f77bcf86cd79943901"] {
            assert!(matches!(repo.get_by_id(id).await, Err(ProductError::InvalidId)));
            assert!(matches!(
                repo.update(
                    id,
                    ProductChanges {
                        stock: Some(1),
                        ..Default::default()
                    }
                )
                .await,
                Err(ProductError::InvalidId)
            ));
            assert!(matches!(repo.delete(id).await, Err(ProductError::InvalidId)));
        }
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (repo, _) = repository();
        let id = ObjectId::new().to_hex();
        assert!(matches!(repo.get_by_id(&id).await, Err(ProductError::NotFound)));
        assert!(matches!(repo.delete(&id).await, Err(ProductError::NotFound)));
        assert!(matches!(
            repo.update(
                &id,
                ProductChanges {
                    name: Some("x".to_string()),
                    ..Default::default()
                }
            )
            .await,
            Err(ProductError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_applies_only_supplied_fields() {
        let (repo, _) = repository();
        let created = repo.create(new_product("Mug", "Kitchen")).await.unwrap();

        let updated = repo
            .update(
                &created.id.to_hex(),
                ProductChanges {
                    price: Some(12.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.stock, created.stock);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn empty_changes_rejected_before_store() {
        let (repo, store) = repository();
        let id = ObjectId::new().to_hex();
        assert!(matches!(
            repo.update(&id, ProductChanges::default()).await,
            Err(ProductError::NoFieldsToUpdate)
        ));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn delete_returns_last_state_and_removes() {
        let (repo, _) = repository();
        let created = repo.create(new_product("Mug", "Kitchen")).await.unwrap();
        let id = created.id.to_hex();

        let deleted = repo.delete(&id).await.unwrap();
        assert_eq!(deleted, created);
        assert!(matches!(repo.get_by_id(&id).await, Err(ProductError::NotFound)));
    }

    #[tokio::test]
    async fn list_filters_orders_and_pages() {
        let (repo, _) = repository();
        for i in 0..5 {
            repo.create(new_product(&format!("Book {}", i), "Books"))
                .await
                .unwrap();
        }
        repo.create(new_product("Lamp", "Home")).await.unwrap();

        let filter = ProductFilter {
            category: Some("Books".to_string()),
        };
        let (first, total) = repo
            .list(&filter, PageRequest { page: 1, limit: 2 })
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(
            first.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["Book 4", "Book 3"]
        );

        let (last, _) = repo
            .list(&filter, PageRequest { page: 3, limit: 2 })
            .await
            .unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].name, "Book 0");

        let (beyond, total) = repo
            .list(&filter, PageRequest { page: 4, limit: 2 })
            .await
            .unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 5);

        let (all, total) = repo
            .list(&ProductFilter::default(), PageRequest { page: 1, limit: 10 })
            .await
            .unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(total, 6);
    }

    #[tokio::test]
    async fn page_far_beyond_total_is_empty() {
        let (repo, _) = repository();
        repo.create(new_product("Mug", "Kitchen")).await.unwrap();

        let (products, total) = repo
            .list(
                &ProductFilter::default(),
                PageRequest {
                    page: 1_000_000_000_000_000_000,
                    limit: 10,
                },
            )
            .await
            .unwrap();
        assert!(products.is_empty());
        assert_eq!(total, 1);
    }
}
