// CommentDao - data access object for table `comment`

use futures::future::BoxFuture;

use crate::config::DEFAULT_GROUP;
use crate::dao::columns::{CommentColumns, COMMENT_COLUMNS};
use crate::dao::model::CommentModel;
use crate::error::{AppError, AppResult};
use crate::framework::context::QueryContext;
use crate::infrastructure::database::{Database, DatabaseTransaction};
use crate::infrastructure::registry::DatabaseRegistry;

pub const COMMENT_TABLE: &str = "comment";

#[derive(Debug, Clone)]
pub struct CommentDao {
    table: &'static str, // underlying table name
    group: &'static str, // database configuration group
    columns: CommentColumns, // column names of the table
}

impl Default for CommentDao {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentDao {
    pub fn new() -> Self {
        Self {
            table: COMMENT_TABLE,
            group: DEFAULT_GROUP,
            columns: COMMENT_COLUMNS,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn columns(&self) -> CommentColumns {
        self.columns
    }

    pub fn group(&self) -> &'static str {
        self.group
    }

    /// Resolve this DAO's group to a database handle
    pub fn db<'r>(&self, registry: &'r DatabaseRegistry) -> AppResult<&'r Database> {
        registry.group(self.group)
    }

    /// Query builder for this table bound to `cx`. Nothing is executed until
    /// a terminal method is called on the returned model.
    pub fn ctx(&self, cx: &QueryContext) -> CommentModel {
        CommentModel::new(self.table, cx.clone())
    }

    /// Run `f` inside a transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err`, in which case that same error is returned. `f` only
    /// sees a `&mut DatabaseTransaction` and cannot finish it itself.
    /// Failures to begin or commit surface as `AppError` converted into `E`.
    #[tracing::instrument(
        name = "comment_transaction",
        skip_all,
        fields(table = self.table, request_id = %cx.request_id())
    )]
    pub async fn transaction<T, E, F>(&self, db: &Database, cx: &QueryContext, f: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut DatabaseTransaction, &'t QueryContext) -> BoxFuture<'t, Result<T, E>>,
        E: From<AppError>,
    {
        let mut tx = cx.run(db.begin_transaction()).await?;

        match f(&mut tx, cx).await {
            Ok(value) => {
                tx.commit().await?;
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                } else {
                    tracing::warn!("transaction rolled back");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_defaults() {
        let dao = CommentDao::new();
        assert_eq!(dao.table(), "comment");
        assert_eq!(dao.group(), "default");
    }

    #[test]
    fn test_column_mapping() {
        let columns = CommentDao::new().columns();
        assert_eq!(columns.id, "id");
        assert_eq!(columns.cid, "cid");
        assert_eq!(columns.uid, "uid");
        assert_eq!(columns.pid, "pid");
        assert_eq!(columns.text, "text");
        assert_eq!(columns.parent_cid, "parent_cid");
        assert_eq!(columns.create_time, "create_time");
        assert_eq!(columns.update_time, "update_time");
    }

    #[test]
    fn test_ctx_binds_table_and_context_without_a_database() {
        let cx = QueryContext::background();
        cx.cancel();

        // Even a cancelled context yields a model; only execution checks it.
        let model = CommentDao::new().ctx(&cx);
        assert_eq!(model.table(), "comment");
        assert_eq!(model.context().request_id(), cx.request_id());
        assert!(!model.has_conditions());
    }

    #[test]
    fn test_db_resolves_default_group() {
        let registry = DatabaseRegistry::new();
        assert!(matches!(
            CommentDao::new().db(&registry),
            Err(AppError::ConfigurationError(_))
        ));
    }
}
