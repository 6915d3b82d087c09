/// Database migration runner
///
/// This module runs the SQL migrations embedded from the `migrations/`
/// directory at the crate root using sqlx's migration system.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to execute or the connection is
/// lost during migration. Failed migrations are rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
