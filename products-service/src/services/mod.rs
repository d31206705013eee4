pub mod database;
pub mod memory;
pub mod metrics;
pub mod repository;
pub mod store;

pub use database::MongoDb;
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use repository::{parse_product_id, ProductRepository};
pub use store::ProductStore;
