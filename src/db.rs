use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use tokio::task::JoinError;

use crate::domain::errors::{classify_database_message, DomainError};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().build(manager)
}

/// Run a diesel closure on the blocking thread pool with a pooled
/// connection.
pub async fn run_blocking<T, F>(pool: &DbPool, f: F) -> Result<T, DomainError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await?
}

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => DomainError::NotFound,
            other => classify_database_message(&other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<JoinError> for DomainError {
    fn from(e: JoinError) -> Self {
        DomainError::Internal(format!("database task failed: {e}"))
    }
}
