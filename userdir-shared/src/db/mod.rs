/// PostgreSQL plumbing for the directory
///
/// - `pool`: connection pool creation, health check and shutdown
/// - `migrations`: embedded schema migrations for `organizations` and `users`
///
/// The row-level queries live next to their models (`models::user`, `models::organization`)
/// and are reached through `store::PgUserStore`.
///
/// # Example
///
/// ```no_run
/// use userdir_shared::db::pool::{create_pool, DatabaseConfig};
/// use userdir_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
