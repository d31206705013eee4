pub mod metrics;
pub mod panic;
pub mod security_headers;
pub mod tracing;
