use std::{ops::Deref, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

pub struct DatabaseOptions {
    pub pool_size: u32,
    pub timeout_seconds: u8,
    pub url: String,
}

/// Handle to the Postgres database backing the transfer store.
#[derive(Clone)]
pub struct PostgresConnection(PgPool);

impl PostgresConnection {
    pub async fn connect(opts: &DatabaseOptions) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(opts.pool_size)
            .acquire_timeout(Duration::from_secs(opts.timeout_seconds.into()))
            .connect(&opts.url)
            .await?;

        Ok(Self(pool))
    }
}

impl Deref for PostgresConnection {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
