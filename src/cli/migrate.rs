use sqlx::{migrate::MigrateError, postgres::PgPoolOptions};
use tracing::info;

pub struct MigrationOpts {
    pub database_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect to the database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

pub async fn run_migrations(opts: MigrationOpts) -> Result<(), MigrationError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&opts.database_url)
        .await?;

    info!("Running database migrations.");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations complete.");

    Ok(())
}
