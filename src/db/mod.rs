//! Connection pool, schema management and the per-request session helpers.
//!
//! Handlers never touch the pool directly. They take a [`DbSession`] (one pooled
//! connection for the lifetime of the request) or a [`UserDb`] (the user store built
//! on top of a session) as extractor arguments, and actix-web resolves them per request.

pub mod session;
pub mod user_db;

pub use session::DbSession;
pub use user_db::UserDb;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;

const DROP_TABLES: [&str; 2] = ["DROP TABLE IF EXISTS tasks", "DROP TABLE IF EXISTS users"];

const CREATE_TABLES: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        email VARCHAR(320) NOT NULL,
        hashed_password VARCHAR(1024) NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
        is_verified BOOLEAN NOT NULL DEFAULT FALSE,
        username VARCHAR NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS ix_users_email_lower ON users (lower(email))",
    "CREATE TABLE IF NOT EXISTS tasks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(50) NOT NULL,
        description VARCHAR NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        author_id INTEGER NOT NULL
            CONSTRAINT tasks_author_id_fkey REFERENCES users (id) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS ix_tasks_author_id ON tasks (author_id)",
];

/// Indexes older schemas created that the current one replaces.
const RETIRED_INDEXES: [&str; 1] = ["DROP INDEX IF EXISTS ix_users_email"];

/// Builds the application's connection pool.
///
/// Connections are opened on demand and closed again after sitting idle, so an idle
/// service holds no connections open.
pub async fn create_pool(config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(0)
        .idle_timeout(Duration::from_secs(60))
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;
    log::info!(
        "Connected to database (max {} connections)",
        config.max_connections
    );
    Ok(pool)
}

/// Drops every table and recreates the schema from scratch, in one transaction.
///
/// All existing users and tasks are lost.
pub async fn init_models(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for statement in DROP_TABLES.iter().chain(CREATE_TABLES.iter()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    log::warn!("Database schema dropped and recreated");
    Ok(())
}

/// Creates any missing tables and indexes, leaving existing data alone.
///
/// Safe to run on every start.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for statement in CREATE_TABLES.iter().chain(RETIRED_INDEXES.iter()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    log::debug!("Database schema is up to date");
    Ok(())
}
