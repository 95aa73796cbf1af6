pub mod compute;
pub mod metadata;
pub mod registry;
pub mod trend;
