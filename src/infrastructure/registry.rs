// Database registry - named groups resolved to pool handles
// Built once at startup and passed to whatever needs a connection.

use std::collections::BTreeMap;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use crate::infrastructure::database::Database;

#[derive(Clone, Debug, Default)]
pub struct DatabaseRegistry {
    groups: BTreeMap<String, Database>,
}

impl DatabaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect every configured group
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let mut registry = Self::new();
        for (name, group) in &config.groups {
            let db = Database::connect(group).await?;
            registry.insert(name.clone(), db);
        }
        Ok(registry)
    }

    /// Register a handle under `name`, replacing any previous one
    pub fn insert(&mut self, name: impl Into<String>, db: Database) -> Option<Database> {
        self.groups.insert(name.into(), db)
    }

    pub fn group(&self, name: &str) -> AppResult<&Database> {
        self.groups.get(name).ok_or_else(|| {
            AppError::ConfigurationError(format!("database group '{}' is not configured", name))
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub async fn close(&self) {
        for db in self.groups.values() {
            db.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupConfig;

    #[tokio::test]
    async fn test_connect_all_groups() {
        let dir = tempfile::tempdir().unwrap();
        let mut groups = BTreeMap::new();
        for name in ["default", "archive"] {
            let url = format!("sqlite://{}", dir.path().join(format!("{name}.db")).display());
            groups.insert(name.to_string(), GroupConfig::new(url));
        }

        let registry = DatabaseRegistry::connect(&DatabaseConfig { groups })
            .await
            .unwrap();

        assert_eq!(registry.groups().collect::<Vec<_>>(), vec!["archive", "default"]);
        registry.group("archive").unwrap().health_check().await.unwrap();
        registry.close().await;
    }

    #[test]
    fn test_unknown_group() {
        let registry = DatabaseRegistry::new();
        assert!(matches!(
            registry.group("default"),
            Err(AppError::ConfigurationError(_))
        ));
    }
}
