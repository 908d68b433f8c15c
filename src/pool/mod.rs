//! **Pool** — the public connection-pool facade (`spec.md` §4.4, §4.7, §4.8).

use std::fmt;
use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::counters::Stats;
use crate::driver::Driver;
use crate::error::{Error, Result};

pub(crate) mod connection;
pub(crate) mod idle;
pub(crate) mod inner;
pub(crate) mod maintainer;
pub(crate) mod options;

pub use connection::PooledConnection;
pub use options::PoolOptions;

use inner::PoolInner;

/// A bounded, concurrent pool of connections produced by a [`Driver`].
///
/// Cheap to clone; every clone shares the same underlying pool.
pub struct Pool<D: Driver>(Arc<PoolInner<D>>);

impl<D: Driver> Pool<D> {
    /// Returns a [`PoolOptions`] builder with the default configuration.
    pub fn builder() -> PoolOptions {
        PoolOptions::new()
    }

    pub(crate) fn from_inner(inner: Arc<PoolInner<D>>) -> Self {
        Self(inner)
    }

    /// Blocks the calling thread until a healthy connection is available.
    ///
    /// Bridges the driver's async interface onto a synchronous call the same
    /// way a worker thread would: by driving the acquisition future to
    /// completion on the current thread.
    pub fn get_connection(&self) -> Result<PooledConnection<D>> {
        futures_executor::block_on(self.0.acquire())
    }

    /// Returns a future that resolves to a healthy connection.
    ///
    /// The acquisition itself runs on a spawned task, independent of whether
    /// the returned future is ever polled to completion: if it is dropped
    /// before the task finishes, the connection it obtained is fed back
    /// through the ordinary reuse path instead of leaking as a phantom
    /// `inuse` (`spec.md` §5, "Cancellation").
    pub fn get_connection_async(&self) -> impl Future<Output = Result<PooledConnection<D>>> + 'static
    where
        D::Connection: 'static,
    {
        let inner = Arc::clone(&self.0);
        let (tx, rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let acquired = inner.acquire().await;

            if let Err(unsent) = tx.send(acquired) {
                if let Ok(conn) = unsent {
                    conn.dispose();
                }
            }
        });

        async move { rx.await.unwrap_or(Err(Error::PoolTerminated)) }
    }

    /// A point-in-time snapshot of the pool's counters (`spec.md` §4.7).
    pub fn stats(&self) -> Stats {
        self.0.counters.snapshot()
    }

    /// Terminates the pool: no new connections are started, every idle
    /// connection is disconnected, and any blocked or future
    /// [`get_connection`][Self::get_connection] call fails fast with
    /// [`Error::PoolTerminated`]. In-use connections are unaffected until
    /// their holder disposes of them, at which point they take the
    /// retirement branch of the reuse path.
    pub fn dispose(&self) {
        self.0.terminate.store(true, Ordering::Release);
        self.0.idle.wake_all();
        futures_executor::block_on(self.0.drain());

        let destroyed = self.0.counters.destroyed_without_dispose();
        if destroyed > 0 && self.0.counters.any_reusable() {
            tracing::warn!(
                destroyed,
                "connections were dropped without calling dispose(); each was still \
                 released correctly, but the pool could not scrub it for reuse"
            );
        }
    }
}

impl<D: Driver> Clone for Pool<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D: Driver> fmt::Debug for Pool<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("Pool")
            .field("max_connections", &self.0.options().max_connections)
            .field("min_spare_connections", &self.0.options().min_spare_connections)
            .field("stats", &stats)
            .field("terminated", &self.0.terminate.load(Ordering::Acquire))
            .finish()
    }
}
