use rocket_db_pools::{Database, sqlx};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Database)]
#[database("catalog_db")]
pub struct CatalogDb(sqlx::PgPool);

/// Apply pending migrations from `./migrations`.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
