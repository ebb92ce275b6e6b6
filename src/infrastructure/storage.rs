use diesel::pg::PgConnection;
use diesel::Connection;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::Storage;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

// ── Storage ───────────────────────────────────────────────────────────────────

/// PostgreSQL storage. Handles are pooled connections; the store traits are
/// implemented on `PgConnection` directly so the same code runs inside and
/// outside a transaction.
#[derive(Clone)]
pub struct DieselStorage {
    pool: DbPool,
}

impl DieselStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Storage for DieselStorage {
    type Handle = PgConnection;

    fn read<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, DomainError>,
    {
        let mut conn = self.pool.get()?;
        f(&mut *conn)
    }

    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, DomainError>,
    {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;
        // diesel issues ROLLBACK when the closure returns Err.
        conn.transaction::<T, DomainError, _>(f)
    }
}
