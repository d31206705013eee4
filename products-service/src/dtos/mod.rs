pub mod payload;
pub mod products;

pub use payload::{validate_changes, validate_new_product};
pub use products::{ListParams, PageRequest, ProductFilter, ProductResponse};
