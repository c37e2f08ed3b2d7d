// Comment DAO - typed data access for the `comment` table

// Request context carried into every statement
pub mod framework;

// Database handles, transactions and the group registry
pub mod infrastructure;

// Row types
pub mod entity;

// Table accessors and the query builder
pub mod dao;

// Typed comment operations built on the DAO
pub mod repository;

// Common utilities
pub mod config;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use dao::{CommentDao, COMMENT};
pub use error::{AppError, AppResult};
