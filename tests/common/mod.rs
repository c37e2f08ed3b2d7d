// Shared fixture: a file-backed SQLite database with the comment table.

use comment_dao::config::{GroupConfig, LoggingConfig};
use comment_dao::infrastructure::Database;
use comment_dao::logging::init_logging;
use tempfile::TempDir;

pub const CREATE_COMMENT_TABLE: &str = r#"
    CREATE TABLE comment (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        cid TEXT NOT NULL UNIQUE,
        uid TEXT NOT NULL,
        pid TEXT NOT NULL,
        text TEXT NOT NULL,
        parent_cid TEXT,
        create_time DATETIME NOT NULL,
        update_time DATETIME NOT NULL
    )
"#;

pub struct TestDb {
    // Keeps the database file alive for the duration of the test.
    _dir: TempDir,
    pub db: Database,
}

pub fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("comments.db").display())
}

pub async fn setup() -> TestDb {
    init_logging(&LoggingConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db = Database::connect(&GroupConfig::new(database_url(&dir)))
        .await
        .unwrap();
    sqlx::query(CREATE_COMMENT_TABLE)
        .execute(db.pool())
        .await
        .unwrap();

    TestDb { _dir: dir, db }
}
