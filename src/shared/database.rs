use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::shared::config::Config;

pub struct Database {
  pub pool: Arc<Pool<Postgres>>,
}

impl Database {
  pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
    let pool = prepare_pool(config).await?;
    Ok(Self { pool: Arc::new(pool) })
  }
}

pub async fn prepare_pool(config: &Config) -> Result<Pool<Postgres>, sqlx::Error> {
  PgPoolOptions::new()
    .max_connections(config.database_max_connections)
    .connect(&config.database_url)
    .await
}
