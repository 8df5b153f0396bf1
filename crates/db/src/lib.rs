//! Persistence layer for the CEU service.
//!
//! - [`models`] -- `FromRow` entity structs and insert DTOs.
//! - [`repositories`] -- zero-sized `*Repo` structs with async query methods.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
///
/// `timeout` bounds both connection acquisition and every statement run on
/// a pooled connection (via `statement_timeout`).
pub async fn create_pool(database_url: &str, timeout: Duration) -> Result<DbPool, sqlx::Error> {
    let statement_timeout_ms = timeout.as_millis();
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(timeout)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                let stmt = format!("SET statement_timeout = {statement_timeout_ms}");
                sqlx::query(&stmt).execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
