/// Storage layer
///
/// Explicitly constructed storage handle (a `PgPool`) created on startup
/// and passed down to handlers, plus the generic document operations and
/// per-collection definitions built on top of it.
pub mod collections;
pub mod resource;
pub mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::configuration::DatabaseSettings;

pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.connection_string())
        .await
}

pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
