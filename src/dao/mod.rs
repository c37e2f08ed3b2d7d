// DAO layer - table-scoped accessors over the database registry

pub mod columns;
pub mod comment_dao;
pub mod model;

use once_cell::sync::Lazy;

pub use columns::{Column, CommentColumns};
pub use comment_dao::{CommentDao, COMMENT_TABLE};
pub use model::{CommentModel, Order, Value};

/// Process-wide accessor for table `comment`
pub static COMMENT: Lazy<CommentDao> = Lazy::new(CommentDao::new);
