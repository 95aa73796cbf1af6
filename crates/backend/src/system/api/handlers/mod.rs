// User management handlers
pub mod users;
