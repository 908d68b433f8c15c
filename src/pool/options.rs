//! Construction parameters for a [`Pool`][crate::Pool] (`spec.md` §6).

use std::time::Duration;

use crate::driver::{ConnectArgs, Driver};
use crate::error::Error;
use crate::pool::inner::PoolInner;
use crate::pool::Pool;

/// Builder for [`Pool`][crate::Pool].
///
/// Every setter takes `self` by value so they can be chained; construct with
/// [`PoolOptions::new`] (or [`Pool::builder`][crate::Pool::builder]) and finish
/// with [`build`][Self::build].
#[derive(Clone, Debug)]
pub struct PoolOptions {
    pub(crate) connection_args: ConnectArgs,
    pub(crate) initial_size: u32,
    pub(crate) max_connections: u32,
    pub(crate) min_spare_connections: u32,
    pub(crate) max_idle_duration: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolOptions {
    /// Returns a default configuration: `initial_size = 1`, `max_connections = 10`,
    /// `min_spare_connections = 1`, `max_idle_duration = 60s`.
    pub fn new() -> Self {
        Self {
            connection_args: ConnectArgs::new(),
            initial_size: 1,
            max_connections: 10,
            min_spare_connections: 1,
            max_idle_duration: Duration::from_secs(60),
        }
    }

    /// Connections opened at boot, before any client has requested one.
    pub fn initial_size(mut self, initial_size: u32) -> Self {
        self.initial_size = initial_size;
        self
    }

    /// Hard ceiling on the total number of connections this pool will ever hold open.
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Idle floor the background maintainer tries to keep available.
    pub fn min_spare_connections(mut self, min_spare_connections: u32) -> Self {
        self.min_spare_connections = min_spare_connections;
        self
    }

    /// Prune-tick interval and the idle-age threshold used to trim excess connections.
    pub fn max_idle_duration(mut self, max_idle_duration: Duration) -> Self {
        self.max_idle_duration = max_idle_duration;
        self
    }

    /// Opaque key/value bag forwarded verbatim to [`Driver::connect`] on every connect attempt.
    pub fn connection_args(mut self, connection_args: ConnectArgs) -> Self {
        self.connection_args = connection_args;
        self
    }

    /// Builds the pool and starts its background maintainer.
    ///
    /// `driver_name` is the opaque identifier passed through to
    /// [`Driver::connect`][crate::Driver::connect] on every attempt; `cistern`
    /// never inspects it itself.
    ///
    /// Does not block on opening any connections — the maintainer performs the
    /// initial injection shortly after this returns (`spec.md` §4.5). Must be
    /// called from within a Tokio runtime, since it spawns the maintainer task.
    pub fn build<D: Driver>(self, driver_name: impl Into<String>, driver: D) -> crate::Result<Pool<D>> {
        if self.initial_size < 1 {
            return Err(Error::InvalidConfiguration("initial_size must be at least 1"));
        }

        if self.initial_size > self.max_connections {
            return Err(Error::InvalidConfiguration(
                "initial_size must not exceed max_connections",
            ));
        }

        Ok(Pool::from_inner(PoolInner::spawn(
            driver,
            driver_name.into(),
            self,
        )))
    }
}
