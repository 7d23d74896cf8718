//! Persistence layer: the document store abstraction, its backends, the
//! persisted record shapes, and the repositories built on top of them.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub use store::{DocumentStore, MemoryStore, PgDocumentStore, StoreError};

pub type DbPool = sqlx::PgPool;

/// Collection names.
pub mod collections {
    pub const NOTIFICATIONS: &str = "notifications";
    pub const PROJECTS: &str = "projects";
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
