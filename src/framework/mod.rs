// Framework - request-scoped plumbing shared by DAOs

pub mod context;

pub use context::QueryContext;
