//! Postgres pool and schema migrations.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connect to `database_url` and bring the schema up to date.
pub async fn connect_and_migrate(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");
    Ok(pool)
}
