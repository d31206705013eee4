pub mod health;
pub mod products;

pub use health::{health_check, liveness_check, metrics_endpoint, readiness_check, route_not_found};
pub use products::{create_product, delete_product, get_product, list_products, update_product};
