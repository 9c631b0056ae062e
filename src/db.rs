use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    Ok(db)
}

/// Maps a poisoned in-memory store lock into a repository error.
pub(crate) fn poisoned<E>(_: E) -> anyhow::Error {
    anyhow::anyhow!("in-memory store lock poisoned")
}
