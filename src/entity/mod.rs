// Entities - row types and partial value sets for DAO tables

pub mod comment;

pub use comment::{Comment, CommentDo};
