// Comment entity - one row of the `comment` table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub cid: String,
    pub uid: String,
    pub pid: String,
    pub text: String,
    pub parent_cid: Option<String>,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Comment {
    /// Parent comment id, treating an empty reference as none
    pub fn parent(&self) -> Option<&str> {
        self.parent_cid.as_deref().filter(|cid| !cid.is_empty())
    }

    pub fn is_top_level(&self) -> bool {
        self.parent().is_none()
    }
}

/// Partial set of comment values for inserts and updates.
/// Only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDo {
    pub id: Option<i64>,
    pub cid: Option<String>,
    pub uid: Option<String>,
    pub pid: Option<String>,
    pub text: Option<String>,
    pub parent_cid: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl CommentDo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cid(mut self, cid: impl Into<String>) -> Self {
        self.cid = Some(cid.into());
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn pid(mut self, pid: impl Into<String>) -> Self {
        self.pid = Some(pid.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn parent_cid(mut self, parent_cid: impl Into<String>) -> Self {
        self.parent_cid = Some(parent_cid.into());
        self
    }

    pub fn create_time(mut self, at: DateTime<Utc>) -> Self {
        self.create_time = Some(at);
        self
    }

    pub fn update_time(mut self, at: DateTime<Utc>) -> Self {
        self.update_time = Some(at);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
