use super::store::ProductStore;
use crate::dtos::ProductFilter;
use crate::error::ProductError;
use crate::models::{Product, ProductChanges};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    /// Creates the client. The driver connects lazily, so this does not
    /// fail when the server is down; use [`ProductStore::ping`] for that.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for products-service");

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().name("name_idx".to_string()).build())
            .build();

        let category_index = IndexModel::builder()
            .keys(doc! { "category": 1 })
            .options(
                IndexOptions::builder()
                    .name("category_idx".to_string())
                    .build(),
            )
            .build();

        self.products()
            .create_indexes([name_index, category_index], None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create indexes on products collection: {}", e);
                AppError::from(e)
            })?;

        tracing::info!("Created indexes on products.name and products.category");
        Ok(())
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection("products")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

}

/// Newest first, `_id` breaking ties between records created in the same
/// millisecond. The driver sends skip and limit as `i64`, so both are clamped.
fn find_options(skip: u64, limit: u64) -> FindOptions {
    FindOptions::builder()
        .sort(doc! { "created_at": -1, "_id": -1 })
        .skip(skip.min(i64::MAX as u64))
        .limit(i64::try_from(limit).unwrap_or(i64::MAX))
        .build()
}

fn filter_document(filter: &ProductFilter) -> Document {
    let mut query = Document::new();
    if let Some(category) = &filter.category {
        query.insert("category", category.as_str());
    }
    query
}

#[async_trait]
impl ProductStore for MongoDb {
    async fn find_page(
        &self,
        filter: &ProductFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Product>, ProductError> {
        let cursor = self
            .products()
            .find(filter_document(filter), find_options(skip, limit))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, ProductError> {
        Ok(self
            .products()
            .count_documents(filter_document(filter), None)
            .await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Product>, ProductError> {
        Ok(self.products().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductError> {
        self.products().insert_one(product, None).await?;
        Ok(())
    }

    async fn update_by_id(
        &self,
        id: ObjectId,
        changes: &ProductChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .products()
            .find_one_and_update(
                doc! { "_id": id },
                changes.to_set_document(updated_at),
                options,
            )
            .await?)
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Product>, ProductError> {
        Ok(self
            .products()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?)
    }

    async fn ping(&self) -> Result<(), ProductError> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                ProductError::StoreUnavailable(e.to_string())
            })?;
        Ok(())
    }
}
