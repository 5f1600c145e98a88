use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tessera_core::AppError;

pub async fn connect_and_migrate(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    tessera_infrastructure::run_migrations(&pool).await?;

    Ok(pool)
}
