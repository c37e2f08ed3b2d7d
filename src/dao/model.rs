// Comment Model - chainable query builder scoped to table `comment`
// Builds SQL with sqlx's QueryBuilder and executes on any SQLite executor,
// so the same model runs against the pool or inside a transaction.

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite};

use crate::dao::columns::{Column, COMMENT_COLUMNS};
use crate::entity::{Comment, CommentDo};
use crate::error::{AppError, AppResult};
use crate::framework::context::QueryContext;

/// Bindable value for a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
    Null,
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(Column, Value),
    Ne(Column, Value),
    In(Column, Vec<Value>),
    Null(Column),
    NotNull(Column),
    Like(Column, String),
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Int(v) => qb.push_bind(*v),
        Value::Text(v) => qb.push_bind(v.clone()),
        Value::Time(v) => qb.push_bind(*v),
        Value::Null => qb.push("NULL"),
    };
}

/// Query builder for table `comment`.
///
/// Every chaining method borrows the model and returns a new one, leaving the
/// receiver untouched. A base model can be branched into several queries
/// without the conditions of one leaking into another.
#[derive(Debug, Clone)]
pub struct CommentModel {
    table: &'static str,
    cx: QueryContext,
    conditions: Vec<Condition>,
    orders: Vec<(Column, Order)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl CommentModel {
    pub(crate) fn new(table: &'static str, cx: QueryContext) -> Self {
        Self {
            table,
            cx,
            conditions: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn context(&self) -> &QueryContext {
        &self.cx
    }

    fn with_condition(&self, condition: Condition) -> Self {
        let mut next = self.clone();
        next.conditions.push(condition);
        next
    }

    pub fn where_eq(&self, column: Column, value: impl Into<Value>) -> Self {
        self.with_condition(Condition::Eq(column, value.into()))
    }

    pub fn where_ne(&self, column: Column, value: impl Into<Value>) -> Self {
        self.with_condition(Condition::Ne(column, value.into()))
    }

    /// `column IN (...)`; an empty list matches no rows
    pub fn where_in<I, V>(&self, column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with_condition(Condition::In(
            column,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn where_null(&self, column: Column) -> Self {
        self.with_condition(Condition::Null(column))
    }

    pub fn where_not_null(&self, column: Column) -> Self {
        self.with_condition(Condition::NotNull(column))
    }

    pub fn where_like(&self, column: Column, pattern: impl Into<String>) -> Self {
        self.with_condition(Condition::Like(column, pattern.into()))
    }

    pub fn order_asc(&self, column: Column) -> Self {
        let mut next = self.clone();
        next.orders.push((column, Order::Asc));
        next
    }

    pub fn order_desc(&self, column: Column) -> Self {
        let mut next = self.clone();
        next.orders.push((column, Order::Desc));
        next
    }

    pub fn limit(&self, limit: i64) -> Self {
        let mut next = self.clone();
        next.limit = Some(limit);
        next
    }

    pub fn offset(&self, offset: i64) -> Self {
        let mut next = self.clone();
        next.offset = Some(offset);
        next
    }

    /// 1-based paging; page 0 is treated as page 1. Offsets past `i64::MAX`
    /// saturate, which simply yields an empty page.
    pub fn page(&self, page: u32, size: u32) -> Self {
        let skipped = page.max(1) as i64 - 1;
        self.limit(size as i64)
            .offset(skipped.saturating_mul(size as i64))
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, condition) in self.conditions.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match condition {
                Condition::Eq(column, Value::Null) => {
                    qb.push(column.as_str()).push(" IS NULL");
                }
                Condition::Ne(column, Value::Null) => {
                    qb.push(column.as_str()).push(" IS NOT NULL");
                }
                Condition::Eq(column, value) => {
                    qb.push(column.as_str()).push(" = ");
                    push_value(qb, value);
                }
                Condition::Ne(column, value) => {
                    qb.push(column.as_str()).push(" <> ");
                    push_value(qb, value);
                }
                Condition::In(_, values) if values.is_empty() => {
                    qb.push("1 = 0");
                }
                Condition::In(column, values) => {
                    qb.push(column.as_str()).push(" IN (");
                    for (j, value) in values.iter().enumerate() {
                        if j > 0 {
                            qb.push(", ");
                        }
                        push_value(qb, value);
                    }
                    qb.push(")");
                }
                Condition::Null(column) => {
                    qb.push(column.as_str()).push(" IS NULL");
                }
                Condition::NotNull(column) => {
                    qb.push(column.as_str()).push(" IS NOT NULL");
                }
                Condition::Like(column, pattern) => {
                    qb.push(column.as_str()).push(" LIKE ");
                    qb.push_bind(pattern.clone());
                }
            }
        }
    }

    fn push_tail(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, (column, order)) in self.orders.iter().enumerate() {
            qb.push(if i == 0 { " ORDER BY " } else { ", " });
            qb.push(column.as_str()).push(" ").push(order.as_sql());
        }
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);
            }
            (Some(limit), None) => {
                qb.push(" LIMIT ").push_bind(limit);
            }
            // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
            (None, Some(offset)) => {
                qb.push(" LIMIT -1 OFFSET ").push_bind(offset);
            }
            (None, None) => {}
        }
    }

    fn select_builder(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(COMMENT_COLUMNS.all().join(", "))
            .push(" FROM ")
            .push(self.table);
        self.push_where(&mut qb);
        self.push_tail(&mut qb);
        qb
    }

    /// SQL the model would run for `all`, without executing anything
    pub fn to_sql(&self) -> String {
        self.select_builder().sql().to_string()
    }

    fn trace(&self, sql: &str) {
        tracing::debug!(
            request_id = %self.cx.request_id(),
            table = self.table,
            sql,
            "executing statement"
        );
    }

    pub async fn all<'e, E>(&self, executor: E) -> AppResult<Vec<Comment>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = self.select_builder();
        self.trace(qb.sql());
        self.cx
            .run(async move {
                qb.build_query_as::<Comment>()
                    .fetch_all(executor)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to select from {}: {}", self.table, e))
                    })
            })
            .await
    }

    pub async fn one<'e, E>(&self, executor: E) -> AppResult<Option<Comment>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = self.limit(1).select_builder();
        self.trace(qb.sql());
        self.cx
            .run(async move {
                qb.build_query_as::<Comment>()
                    .fetch_optional(executor)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to select from {}: {}", self.table, e))
                    })
            })
            .await
    }

    /// Row count matching the conditions; ordering and paging are ignored.
    pub async fn count<'e, E>(&self, executor: E) -> AppResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(self.table);
        self.push_where(&mut qb);
        self.trace(qb.sql());
        self.cx
            .run(async move {
                qb.build_query_scalar::<i64>()
                    .fetch_one(executor)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to count {}: {}", self.table, e))
                    })
            })
            .await
    }

    pub async fn exists<'e, E>(&self, executor: E) -> AppResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Ok(self.count(executor).await? > 0)
    }

    /// Insert one row and return its id. Conditions on the model are ignored.
    pub async fn insert<'e, E>(&self, executor: E, values: &CommentDo) -> AppResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        for (name, present) in [
            ("cid", values.cid.is_some()),
            ("uid", values.uid.is_some()),
            ("pid", values.pid.is_some()),
            ("text", values.text.is_some()),
        ] {
            if !present {
                return Err(AppError::Validation(format!(
                    "{} is required to insert into {}",
                    name, self.table
                )));
            }
        }

        let now = Utc::now();
        let mut assignments = writable_values(values);
        if values.id.is_some() {
            assignments.insert(0, (Column::Id, values.id.map(Value::Int)));
        }
        assignments.push((Column::CreateTime, Some(Value::Time(values.create_time.unwrap_or(now)))));
        assignments.push((Column::UpdateTime, Some(Value::Time(values.update_time.unwrap_or(now)))));
        let assignments: Vec<(Column, Value)> = assignments
            .into_iter()
            .filter_map(|(column, value)| value.map(|v| (column, v)))
            .collect();

        let mut qb = QueryBuilder::new("INSERT INTO ");
        qb.push(self.table).push(" (");
        for (i, (column, _)) in assignments.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column.as_str());
        }
        qb.push(") VALUES (");
        for (i, (_, value)) in assignments.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, value);
        }
        qb.push(")");

        self.trace(qb.sql());
        self.cx
            .run(async move {
                qb.build()
                    .execute(executor)
                    .await
                    .map(|result| result.last_insert_rowid())
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to insert into {}: {}", self.table, e))
                    })
            })
            .await
    }

    /// Update matching rows and return how many changed.
    /// `update_time` is stamped with now unless supplied.
    pub async fn update<'e, E>(&self, executor: E, values: &CommentDo) -> AppResult<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if !self.has_conditions() {
            return Err(AppError::Validation(format!(
                "refusing to update {} without a WHERE condition",
                self.table
            )));
        }

        let mut assignments: Vec<(Column, Value)> = writable_values(values)
            .into_iter()
            .chain([(Column::CreateTime, values.create_time.map(Value::Time))])
            .filter_map(|(column, value)| value.map(|v| (column, v)))
            .collect();
        if assignments.is_empty() {
            return Err(AppError::Validation(format!(
                "no values given to update {}",
                self.table
            )));
        }
        assignments.push((
            Column::UpdateTime,
            Value::Time(values.update_time.unwrap_or_else(Utc::now)),
        ));

        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(self.table).push(" SET ");
        for (i, (column, value)) in assignments.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column.as_str()).push(" = ");
            push_value(&mut qb, value);
        }
        self.push_where(&mut qb);

        self.trace(qb.sql());
        self.cx
            .run(async move {
                qb.build()
                    .execute(executor)
                    .await
                    .map(|result| result.rows_affected())
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to update {}: {}", self.table, e))
                    })
            })
            .await
    }

    /// Delete matching rows and return how many were removed
    pub async fn delete<'e, E>(&self, executor: E) -> AppResult<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if !self.has_conditions() {
            return Err(AppError::Validation(format!(
                "refusing to delete from {} without a WHERE condition",
                self.table
            )));
        }

        let mut qb = QueryBuilder::new("DELETE FROM ");
        qb.push(self.table);
        self.push_where(&mut qb);

        self.trace(qb.sql());
        self.cx
            .run(async move {
                qb.build()
                    .execute(executor)
                    .await
                    .map(|result| result.rows_affected())
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to delete from {}: {}", self.table, e))
                    })
            })
            .await
    }
}

// Writable non-key, non-timestamp columns in table order.
// An empty parent reference is written as NULL so top-level comments share one
// representation.
fn writable_values(values: &CommentDo) -> Vec<(Column, Option<Value>)> {
    let parent_cid = values.parent_cid.as_ref().map(|parent| {
        if parent.is_empty() {
            Value::Null
        } else {
            Value::Text(parent.clone())
        }
    });
    vec![
        (Column::Cid, values.cid.clone().map(Value::Text)),
        (Column::Uid, values.uid.clone().map(Value::Text)),
        (Column::Pid, values.pid.clone().map(Value::Text)),
        (Column::Text, values.text.clone().map(Value::Text)),
        (Column::ParentCid, parent_cid),
    ]
}
