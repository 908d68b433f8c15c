//! `PoolInner` — acquisition, injection, and the reuse path (`spec.md` §4.4–§4.6).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;

use crate::counters::Counters;
use crate::driver::{Driver, PoolableConnection};
use crate::error::{Error, Result};
use crate::pool::connection::PooledConnection;
use crate::pool::idle::IdleQueue;
use crate::pool::options::PoolOptions;

/// Startup delay before the maintainer begins its first injection, long enough
/// that the `Arc<PoolInner>` it was spawned from is fully published to the
/// constructing thread before any background work touches it.
pub(crate) const MAINTAINER_STARTUP_DELAY: std::time::Duration = std::time::Duration::from_millis(10);

pub(crate) struct PoolInner<D: Driver> {
    driver: D,
    driver_name: String,
    options: PoolOptions,
    pub(crate) counters: Counters,
    pub(crate) idle: IdleQueue<D::Connection>,
    /// The single "new connection" mutex (`spec.md` §3, invariant 3; §5).
    /// Held across the `Driver::connect` await, so it must not be `std::sync::Mutex`.
    connect_lock: AsyncMutex<()>,
    pub(crate) terminate: AtomicBool,
}

impl<D: Driver> PoolInner<D> {
    /// Constructs the pool and spawns its maintainer task.
    pub(crate) fn spawn(driver: D, driver_name: String, options: PoolOptions) -> Arc<Self> {
        let capacity = options.max_connections.max(1) as usize;

        let inner = Arc::new(Self {
            driver,
            driver_name,
            options,
            counters: Counters::default(),
            idle: IdleQueue::new(capacity),
            connect_lock: AsyncMutex::new(()),
            terminate: AtomicBool::new(false),
        });

        tokio::spawn(crate::pool::maintainer::run(Arc::clone(&inner)));

        inner
    }

    pub(crate) fn options(&self) -> &PoolOptions {
        &self.options
    }

    /// The acquisition algorithm (`spec.md` §4.4): poll, else inject-and-receive,
    /// validate with `ping`, retry on a dead connection.
    pub(crate) async fn acquire(self: &Arc<Self>) -> Result<PooledConnection<D>> {
        self.counters.waiting_inc();

        let conn = loop {
            if self.terminate.load(Ordering::Acquire) {
                self.counters.waiting_dec();
                return Err(Error::PoolTerminated);
            }

            let idle = match self.idle.poll() {
                Some(idle) => idle,
                None => {
                    // Request injection before blocking, closing the lost-wakeup
                    // hazard described in `spec.md` §9: without this hint a sole
                    // waiter could sleep forever with no producer in flight.
                    if self.counters.total() < self.options.max_connections {
                        let this = Arc::clone(self);
                        tokio::spawn(async move { this.inject_connections().await });
                    }

                    match self
                        .idle
                        .receive_async(|| self.terminate.load(Ordering::Acquire))
                        .await
                    {
                        Some(idle) => idle,
                        None => {
                            self.counters.waiting_dec();
                            return Err(Error::PoolTerminated);
                        }
                    }
                }
            };

            self.counters.idle_dec_and_track_low_water();
            self.counters.inuse_inc();

            let mut conn = idle.conn;
            if conn.ping().await {
                break conn;
            }

            tracing::trace!("discarding dead connection found on handout");
            self.counters.inuse_dec();
            self.retire(conn).await;
        };

        self.counters.waiting_dec();
        Ok(PooledConnection::new(conn, Arc::clone(self)))
    }

    /// Opens new connections while waiters exist or the spare floor is unmet,
    /// serialized by `connect_lock` (`spec.md` §4.5, §5).
    pub(crate) async fn inject_connections(self: Arc<Self>) {
        let _guard = self.connect_lock.lock().await;

        if self.terminate.load(Ordering::Acquire) {
            return;
        }

        while (self.counters.waiting() > 0 || self.counters.idle() < self.options.min_spare_connections)
            && self.counters.total() < self.options.max_connections
        {
            self.counters.starting_inc();

            match self.driver.connect(&self.driver_name, &self.options.connection_args).await {
                Ok(conn) => {
                    self.counters.starting_dec();
                    self.counters.idle_inc();
                    self.idle.offer(conn);
                    tracing::trace!("opened a new connection");
                }
                Err(error) => {
                    self.counters.starting_dec();
                    tracing::warn!(%error, "error establishing a new connection");
                    break;
                }
            }
        }
    }

    /// Opens `initial_size` connections unconditionally, bypassing the
    /// spare-floor gate so the first maintainer tick always reaches it
    /// (`spec.md` §4.5 step 1).
    pub(crate) async fn inject_initial(self: &Arc<Self>) {
        let _guard = self.connect_lock.lock().await;

        for _ in 0..self.options.initial_size {
            if self.terminate.load(Ordering::Acquire) {
                return;
            }

            self.counters.starting_inc();

            match self.driver.connect(&self.driver_name, &self.options.connection_args).await {
                Ok(conn) => {
                    self.counters.starting_dec();
                    self.counters.idle_inc();
                    self.idle.offer(conn);
                }
                Err(error) => {
                    self.counters.starting_dec();
                    tracing::warn!(%error, "error establishing initial connection");
                }
            }
        }
    }

    /// The reuse path (`spec.md` §4.6), invoked from [`PooledConnection::dispose`]
    /// and from its `Drop` fallback.
    pub(crate) async fn reuse(self: Arc<Self>, mut conn: D::Connection) {
        self.counters.scrub_inc();
        self.counters.inuse_dec();

        if conn.supports_reuse() {
            self.counters.mark_reusable_seen();
        }

        let terminating = self.terminate.load(Ordering::Acquire);

        if terminating || !conn.supports_reuse() || !conn.ping().await {
            self.counters.scrub_dec();
            self.retire(conn).await;
            return;
        }

        match conn.scrub_for_reuse().await {
            Ok(()) => {
                self.counters.idle_inc();
                self.counters.scrub_dec();
                self.idle.offer(conn);
                tracing::trace!("connection scrubbed and returned to the idle queue");
            }
            Err(error) => {
                tracing::warn!(%error, "scrub_for_reuse failed, retiring connection");
                self.counters.scrub_dec();
                self.retire(conn).await;
            }
        }
    }

    /// Releases driver resources and, unless the pool is terminating,
    /// schedules replacement capacity.
    async fn retire(self: &Arc<Self>, conn: D::Connection) {
        conn.raw_disconnect().await;
        tracing::trace!("connection retired");

        if !self.terminate.load(Ordering::Acquire) {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.inject_connections().await });
        }
    }

    /// Drains every idle connection via `raw_disconnect` (`spec.md` §4.8, §9's
    /// resolved "drain until `poll()` returns absent").
    pub(crate) async fn drain(&self) {
        while let Some(idle) = self.idle.poll() {
            self.counters.idle_dec();
            idle.conn.raw_disconnect().await;
        }
    }
}
