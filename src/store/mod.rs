//! PostgreSQL persistence for users and todos.
//!
//! Every operation is a single statement on the shared `PgPool`. Dropping a
//! store future (for instance when actix cancels a handler after the client
//! disconnects) drops the in-flight query with it.

pub mod todos;
pub mod users;

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;

pub use todos::TodoStore;
pub use users::UserStore;

const CREATE_USER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS todo_user (
    id SERIAL PRIMARY KEY,
    email VARCHAR(100) UNIQUE NOT NULL,
    encrypted_password VARCHAR(100) NOT NULL
)"#;

const CREATE_TODO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS todo (
    id SERIAL PRIMARY KEY,
    title VARCHAR(100) NOT NULL,
    content VARCHAR(1000) NOT NULL,
    created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated TIMESTAMPTZ,
    created_by INTEGER NOT NULL REFERENCES todo_user(id) ON DELETE CASCADE,
    updated_by INTEGER REFERENCES todo_user(id) ON DELETE SET NULL,
    done BOOLEAN NOT NULL DEFAULT FALSE
)"#;

/// Opens the connection pool described by `config`.
///
/// Each connection is started with a server-side `statement_timeout`, so a
/// hung query is cancelled by Postgres even if nothing on our side gives up.
pub async fn connect(config: &Config) -> Result<PgPool, AppError> {
    let options = PgConnectOptions::from_str(&config.database_url)
        .map_err(|e| AppError::Config(format!("Invalid database URL: {}", e)))?
        .options([(
            "statement_timeout",
            format!("{}ms", config.db_statement_timeout.as_millis()),
        )]);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates both tables if they are missing. Safe to run on every start.
pub async fn init_schema(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(CREATE_USER_TABLE).execute(pool).await?;
    sqlx::query(CREATE_TODO_TABLE).execute(pool).await?;
    Ok(())
}
