use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS resume (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        filename VARCHAR(200) NOT NULL,
        content  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       VARCHAR(200) NOT NULL,
        description TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comparison (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        resume_id INTEGER NOT NULL REFERENCES resume(id),
        job_id    INTEGER NOT NULL REFERENCES job(id),
        score     REAL NOT NULL,
        keywords  TEXT
    )
    "#,
];

/// Creates a SQLite connection pool and makes sure the tables exist.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    info!("Connecting to database...");

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    create_tables(&pool).await?;

    info!("Database pool established");
    Ok(pool)
}

/// Idempotent; existing tables are left untouched.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    // one connection: every new in-memory connection is a fresh, empty database
    create_pool("sqlite::memory:", 1).await.unwrap()
}
