// Comment Repository - typed operations over the comment DAO
// Callers that do not need the raw query builder go through this trait.

use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::dao::{Column, CommentDao};
use crate::entity::{Comment, CommentDo};
use crate::error::{AppError, AppResult};
use crate::framework::context::QueryContext;
use crate::infrastructure::database::Database;

/// Values supplied when posting a comment; the id and timestamps are assigned
/// on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub uid: String,
    pub pid: String,
    pub text: String,
    pub parent_cid: Option<String>,
}

impl NewComment {
    pub fn top_level(uid: impl Into<String>, pid: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            pid: pid.into(),
            text: text.into(),
            parent_cid: None,
        }
    }

    pub fn reply_to(mut self, parent_cid: impl Into<String>) -> Self {
        self.parent_cid = Some(parent_cid.into());
        self
    }
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn get(&self, cx: &QueryContext, cid: &str) -> AppResult<Option<Comment>>;

    /// Store a new comment under a freshly generated cid
    async fn create(&self, cx: &QueryContext, comment: NewComment) -> AppResult<Comment>;

    /// Top-level comments of a prompt, oldest first
    async fn list_for_prompt(
        &self,
        cx: &QueryContext,
        pid: &str,
        page: u32,
        size: u32,
    ) -> AppResult<Vec<Comment>>;

    /// Direct replies to a comment, oldest first
    async fn list_replies(&self, cx: &QueryContext, parent_cid: &str) -> AppResult<Vec<Comment>>;

    /// All comments on a prompt, replies included
    async fn count_for_prompt(&self, cx: &QueryContext, pid: &str) -> AppResult<i64>;

    /// Replace a comment's text; false when no such comment exists
    async fn update_text(&self, cx: &QueryContext, cid: &str, text: &str) -> AppResult<bool>;

    /// Delete a comment together with every reply beneath it, at any depth
    async fn delete_thread(&self, cx: &QueryContext, cid: &str) -> AppResult<u64>;
}

pub struct SqlCommentRepository {
    dao: CommentDao,
    db: Database,
}

impl SqlCommentRepository {
    pub fn new(dao: CommentDao, db: Database) -> Self {
        Self { dao, db }
    }

    pub fn dao(&self) -> &CommentDao {
        &self.dao
    }
}

// Keeps each IN list well under SQLite's bound-parameter limit.
const IN_CHUNK: usize = 500;

fn require_text(text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("comment text must not be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl CommentRepository for SqlCommentRepository {
    async fn get(&self, cx: &QueryContext, cid: &str) -> AppResult<Option<Comment>> {
        self.dao
            .ctx(cx)
            .where_eq(Column::Cid, cid)
            .one(self.db.pool())
            .await
    }

    async fn create(&self, cx: &QueryContext, comment: NewComment) -> AppResult<Comment> {
        require_text(&comment.text)?;

        let cid = Uuid::new_v4().to_string();
        let mut values = CommentDo::new()
            .cid(cid.clone())
            .uid(comment.uid)
            .pid(comment.pid)
            .text(comment.text);
        values.parent_cid = comment.parent_cid.filter(|parent| !parent.is_empty());

        let dao = self.dao.clone();
        let created = self
            .dao
            .transaction(&self.db, cx, move |tx, cx| {
                Box::pin(async move {
                    let id = dao.ctx(cx).insert(tx.conn(), &values).await?;
                    dao.ctx(cx)
                        .where_eq(Column::Id, id)
                        .one(tx.conn())
                        .await?
                        .ok_or_else(|| {
                            AppError::Internal(format!("comment row {} missing after insert", id))
                        })
                })
            })
            .await?;

        tracing::info!(cid = %cid, pid = %created.pid, "comment created");
        Ok(created)
    }

    async fn list_for_prompt(
        &self,
        cx: &QueryContext,
        pid: &str,
        page: u32,
        size: u32,
    ) -> AppResult<Vec<Comment>> {
        self.dao
            .ctx(cx)
            .where_eq(Column::Pid, pid)
            .where_null(Column::ParentCid)
            .order_asc(Column::CreateTime)
            .order_asc(Column::Id)
            .page(page, size)
            .all(self.db.pool())
            .await
    }

    async fn list_replies(&self, cx: &QueryContext, parent_cid: &str) -> AppResult<Vec<Comment>> {
        self.dao
            .ctx(cx)
            .where_eq(Column::ParentCid, parent_cid)
            .order_asc(Column::CreateTime)
            .order_asc(Column::Id)
            .all(self.db.pool())
            .await
    }

    async fn count_for_prompt(&self, cx: &QueryContext, pid: &str) -> AppResult<i64> {
        self.dao
            .ctx(cx)
            .where_eq(Column::Pid, pid)
            .count(self.db.pool())
            .await
    }

    async fn update_text(&self, cx: &QueryContext, cid: &str, text: &str) -> AppResult<bool> {
        require_text(text)?;

        let changed = self
            .dao
            .ctx(cx)
            .where_eq(Column::Cid, cid)
            .update(self.db.pool(), &CommentDo::new().text(text))
            .await?;
        Ok(changed > 0)
    }

    async fn delete_thread(&self, cx: &QueryContext, cid: &str) -> AppResult<u64> {
        let dao = self.dao.clone();
        let cid = cid.to_string();
        let removed = self
            .dao
            .transaction(&self.db, cx, move |tx, cx| {
                Box::pin(async move {
                    // Walk the reply tree level by level; `seen` guards against cycles.
                    let mut seen: HashSet<String> = HashSet::from([cid.clone()]);
                    let mut doomed = vec![cid];
                    let mut frontier = doomed.clone();
                    while !frontier.is_empty() {
                        let mut next = Vec::new();
                        for parents in frontier.chunks(IN_CHUNK) {
                            let children = dao
                                .ctx(cx)
                                .where_in(Column::ParentCid, parents)
                                .all(tx.conn())
                                .await?;
                            next.extend(
                                children
                                    .into_iter()
                                    .map(|child| child.cid)
                                    .filter(|child| seen.insert(child.clone())),
                            );
                        }
                        doomed.extend(next.iter().cloned());
                        frontier = next;
                    }

                    let mut removed = 0;
                    for cids in doomed.chunks(IN_CHUNK) {
                        removed += dao
                            .ctx(cx)
                            .where_in(Column::Cid, cids)
                            .delete(tx.conn())
                            .await?;
                    }
                    Ok::<u64, AppError>(removed)
                })
            })
            .await?;

        tracing::debug!(removed, "comment thread deleted");
        Ok(removed)
    }
}
