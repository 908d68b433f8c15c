//! The connection wrapper clients actually hold (`spec.md` §4.2, §9).

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::driver::Driver;
use crate::pool::inner::PoolInner;

const DEREF_ERR: &str = "(bug) connection already disposed";

/// A connection checked out from a [`Pool`][crate::Pool].
///
/// Delegates every driver operation to the wrapped connection via `Deref`. Its
/// own [`dispose`][Self::dispose] does *not* call `raw_disconnect` directly —
/// it hands the connection back to the pool, which decides between scrubbing
/// it for reuse and retiring it (`spec.md` §4.6).
///
/// Dropping a `PooledConnection` without calling `dispose` first still
/// releases it correctly, but is counted as a diagnostic: see the crate-level
/// docs and [`Pool::stats`][crate::Pool::stats].
pub struct PooledConnection<D: Driver> {
    conn: Option<D::Connection>,
    pool: Arc<PoolInner<D>>,
}

impl<D: Driver> PooledConnection<D> {
    pub(crate) fn new(conn: D::Connection, pool: Arc<PoolInner<D>>) -> Self {
        Self {
            conn: Some(conn),
            pool,
        }
    }

    /// Hands the connection back to the pool.
    ///
    /// The pool decides, asynchronously and without blocking this call,
    /// whether the connection is scrubbed for reuse or retired.
    pub fn dispose(mut self) {
        if let Some(conn) = self.conn.take() {
            let pool = Arc::clone(&self.pool);
            tokio::spawn(async move { pool.reuse(conn).await });
        }
    }
}

impl<D: Driver> Deref for PooledConnection<D> {
    type Target = D::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect(DEREF_ERR)
    }
}

impl<D: Driver> DerefMut for PooledConnection<D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect(DEREF_ERR)
    }
}

/// Finalizes a connection that was never explicitly disposed.
///
/// Still releases it through the ordinary reuse path, but also tallies it as
/// "destroyed without dispose" (`spec.md` §4.2) so `Pool` teardown can warn
/// about it.
impl<D: Driver> Drop for PooledConnection<D> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.counters.destroyed_without_dispose_inc();
            let pool = Arc::clone(&self.pool);
            tokio::spawn(async move { pool.reuse(conn).await });
        }
    }
}
