//! services/app/src/adapters/prefs.rs
//!
//! This module contains the preference storage adapter, the concrete
//! implementation of the `PreferenceStore` port from the `core` crate. It keeps
//! string sets in a local SQLite database using `sqlx`.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::BTreeSet;
use wellness_core::ports::{PortError, PortResult, PreferenceStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A preference adapter that implements the `PreferenceStore` port.
#[derive(Clone)]
pub struct SqlitePreferences {
    pool: SqlitePool,
}

impl SqlitePreferences {
    /// Creates a new `SqlitePreferences` over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`.
    ///
    /// An in-memory database lives per connection, so `sqlite::memory:` is
    /// opened with a single connection.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct MemberRecord {
    member: String,
}

fn storage_error(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

//=========================================================================================
// `PreferenceStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PreferenceStore for SqlitePreferences {
    async fn get_string_set(&self, key: &str) -> PortResult<BTreeSet<String>> {
        let records = sqlx::query_as::<_, MemberRecord>(
            "SELECT member FROM preference_sets WHERE key = ?1",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(records.into_iter().map(|r| r.member).collect())
    }

    async fn put_string_set(&self, key: &str, values: &BTreeSet<String>) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query("DELETE FROM preference_sets WHERE key = ?1")
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        for value in values {
            sqlx::query("INSERT INTO preference_sets (key, member) VALUES (?1, ?2)")
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await
                .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM preference_sets WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wellness_core::favorites::FavoriteStore;

    async fn memory_store() -> SqlitePreferences {
        let prefs = SqlitePreferences::connect("sqlite::memory:").await.unwrap();
        prefs.run_migrations().await.unwrap();
        prefs
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn missing_key_reads_empty() {
        let prefs = memory_store().await;
        assert!(prefs.get_string_set("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_replaces_the_whole_set() {
        let prefs = memory_store().await;
        prefs.put_string_set("k", &set(&["1", "2"])).await.unwrap();
        prefs.put_string_set("k", &set(&["2", "3"])).await.unwrap();
        assert_eq!(prefs.get_string_set("k").await.unwrap(), set(&["2", "3"]));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let prefs = memory_store().await;
        prefs.put_string_set("a", &set(&["1"])).await.unwrap();
        prefs.put_string_set("b", &set(&["9"])).await.unwrap();
        prefs.remove("a").await.unwrap();
        assert!(prefs.get_string_set("a").await.unwrap().is_empty());
        assert_eq!(prefs.get_string_set("b").await.unwrap(), set(&["9"]));
    }

    #[tokio::test]
    async fn favorites_survive_reopening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("prefs.db").display());

        {
            let prefs = SqlitePreferences::connect(&url).await.unwrap();
            prefs.run_migrations().await.unwrap();
            let favorites = FavoriteStore::new(Arc::new(prefs.clone()));
            assert!(favorites.toggle(12).await.unwrap());
            prefs.pool.close().await;
        }

        let prefs = SqlitePreferences::connect(&url).await.unwrap();
        prefs.run_migrations().await.unwrap();
        let favorites = FavoriteStore::new(Arc::new(prefs));
        assert!(favorites.contains(12).await.unwrap());
    }
}
