//! Connection pooling and migrations.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use forge_error::{DatabaseError, DatabaseErrorKind};
use tracing::{info, instrument};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Shared Postgres connection pool.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool and checks that one connection can be opened.
///
/// # Errors
///
/// Returns an error if the pool cannot be built or the warm-up connection fails.
#[instrument(skip(database_url))]
pub fn establish_pool(database_url: &str, max_size: u32) -> DatabaseResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size.max(1))
        .build(manager)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Pool(e.to_string())))?;

    // Warm up the pool so a bad URL fails at startup rather than on the first request
    {
        let _conn = pool.get()?;
    }

    info!(max_size, "Database pool ready");
    Ok(pool)
}

/// Run pending migrations.
///
/// # Errors
///
/// Returns an error if a connection cannot be checked out or a migration fails.
#[instrument(skip(pool))]
pub fn run_migrations(pool: &PgPool) -> DatabaseResult<()> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
    info!(count = applied.len(), "Migrations applied");
    Ok(())
}

/// Runs blocking diesel work on the blocking thread pool with a pooled connection.
pub(crate) async fn run_blocking<T, E, F>(pool: &PgPool, op: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<DatabaseError> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<T, E> {
        let mut conn = pool.get().map_err(DatabaseError::from)?;
        op(&mut conn)
    })
    .await
    .map_err(|e| E::from(DatabaseError::new(DatabaseErrorKind::Join(e.to_string()))))?
}
