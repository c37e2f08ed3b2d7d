// Core infrastructure modules
pub mod database; // Pool handle and transaction wrapper
pub mod registry; // Group name to pool resolution

pub use database::{Database, DatabaseTransaction};
pub use registry::DatabaseRegistry;
