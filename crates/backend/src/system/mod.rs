pub mod api;
pub mod tracing;
pub mod users;
