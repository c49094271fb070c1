//! `PostgreSQL` store backed by a Diesel r2d2 pool.

pub(crate) mod models;
pub(crate) mod schema;

use super::StoreFailure;
use diesel::connection::{Connection, SimpleConnection};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

const CREATE_SCHEMA_SQL: &str =
    include_str!("../../../migrations/2026-10-19-000000_create_tracker_schema/up.sql");

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`StoreFailure::Pool`] when the initial connections cannot be
/// established.
pub fn connect(database_url: &str, max_size: u32) -> Result<PgPool, StoreFailure> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder().max_size(max_size).build(manager)?)
}

/// Creates every table and index that does not exist yet.
///
/// # Errors
///
/// Returns [`StoreFailure`] when no connection is available or the DDL
/// fails.
pub async fn apply_schema(pool: &PgPool) -> Result<(), StoreFailure> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get()?;
        connection.batch_execute(CREATE_SCHEMA_SQL)?;
        Ok(())
    })
    .await?
}

/// `PostgreSQL`-backed store implementing every repository port.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore").finish_non_exhaustive()
    }
}

impl PostgresStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs `f` on a pooled connection off the async runtime.
    pub(crate) async fn run_blocking<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreFailure> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(|err| E::from(StoreFailure::from(err)))?;
            f(&mut connection)
        })
        .await
        .map_err(|err| E::from(StoreFailure::from(err)))?
    }
}

/// Maps a Diesel error into the caller's error type.
pub(crate) fn query_failed<E: From<StoreFailure>>(err: diesel::result::Error) -> E {
    E::from(StoreFailure::Query(err))
}

enum TransactionError<E> {
    Rejected(E),
    Query(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TransactionError<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Query(err)
    }
}

/// Runs `f` inside a database transaction, rolling back when it fails.
pub(crate) fn in_transaction<T, E, F>(connection: &mut PgConnection, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E>,
    E: From<StoreFailure>,
{
    connection
        .transaction::<T, TransactionError<E>, _>(|tx| f(tx).map_err(TransactionError::Rejected))
        .map_err(|err| match err {
            TransactionError::Rejected(inner) => inner,
            TransactionError::Query(query) => query_failed(query),
        })
}

/// Escapes `LIKE` metacharacters in user input.
pub(crate) fn escape_like(raw: &str) -> String {
    raw.trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
