// Column names for table `comment`

use std::fmt;

/// Column names of the `comment` table, one field per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentColumns {
    pub id: &'static str,          // pk
    pub cid: &'static str,         // comment id
    pub uid: &'static str,         // user id
    pub pid: &'static str,         // prompt id
    pub text: &'static str,        // comment content
    pub parent_cid: &'static str,  // replied-to comment id
    pub create_time: &'static str, // created time
    pub update_time: &'static str, // updated time
}

pub(crate) const COMMENT_COLUMNS: CommentColumns = CommentColumns {
    id: "id",
    cid: "cid",
    uid: "uid",
    pid: "pid",
    text: "text",
    parent_cid: "parent_cid",
    create_time: "create_time",
    update_time: "update_time",
};

impl CommentColumns {
    /// All column names in table order
    pub fn all(&self) -> [&'static str; 8] {
        [
            self.id,
            self.cid,
            self.uid,
            self.pid,
            self.text,
            self.parent_cid,
            self.create_time,
            self.update_time,
        ]
    }
}

/// Typed column reference used by the query builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Cid,
    Uid,
    Pid,
    Text,
    ParentCid,
    CreateTime,
    UpdateTime,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Id,
        Column::Cid,
        Column::Uid,
        Column::Pid,
        Column::Text,
        Column::ParentCid,
        Column::CreateTime,
        Column::UpdateTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => COMMENT_COLUMNS.id,
            Column::Cid => COMMENT_COLUMNS.cid,
            Column::Uid => COMMENT_COLUMNS.uid,
            Column::Pid => COMMENT_COLUMNS.pid,
            Column::Text => COMMENT_COLUMNS.text,
            Column::ParentCid => COMMENT_COLUMNS.parent_cid,
            Column::CreateTime => COMMENT_COLUMNS.create_time,
            Column::UpdateTime => COMMENT_COLUMNS.update_time,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_enum_matches_mapping() {
        let names: Vec<&str> = Column::ALL.iter().map(Column::as_str).collect();
        assert_eq!(names, COMMENT_COLUMNS.all().to_vec());
        assert_eq!(Column::ParentCid.to_string(), "parent_cid");
    }
}
