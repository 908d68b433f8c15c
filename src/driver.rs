//! The external contract a database driver must satisfy to be pooled.
//!
//! Wire protocol, SQL parsing, prepared statements, transaction control, and
//! driver loading all live on the other side of this boundary; `cistern`
//! only ever calls the five operations below.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::error::Error;

/// An opaque bag of key/value arguments forwarded verbatim to [`Driver::connect`].
///
/// `cistern` never inspects these; they exist so a `Driver` impl can carry
/// whatever host/credentials/TLS configuration its connection constructor needs
/// without the pool having to know its shape.
#[derive(Clone, Debug, Default)]
pub struct ConnectArgs(Arc<HashMap<String, String>>);

impl ConnectArgs {
    /// Starts an empty argument bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key/value pair, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.0).insert(key.into(), value.into());
        self
    }

    /// Looks up a previously inserted value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Opens new connections on behalf of a [`Pool`][crate::Pool].
///
/// A `Driver` is the only thing a pool knows about "a database": given the
/// opaque `name` and [`ConnectArgs`] it was configured with, it produces a
/// [`PoolableConnection`]. Everything else — liveness checks, session reset,
/// teardown — is a property of the connection itself, not the driver.
pub trait Driver: Send + Sync + 'static {
    /// The connection type this driver produces.
    type Connection: PoolableConnection;

    /// Opens a single new connection.
    ///
    /// A failure here is fatal to *this* attempt only; the caller (background
    /// injection, or an inline connect for an async acquire) decides whether
    /// to retry.
    fn connect(
        &self,
        name: &str,
        args: &ConnectArgs,
    ) -> impl Future<Output = Result<Self::Connection, Error>> + Send + '_;
}

/// Operations `cistern` performs on a live connection.
///
/// Implementations must ensure [`ping`][Self::ping] never panics or blocks
/// indefinitely: it is a cheap liveness probe run on every handout.
pub trait PoolableConnection: Send + Sized + 'static {
    /// Cheap liveness check. Must not raise; a dead connection reports `false`,
    /// it does not return an error.
    fn ping(&mut self) -> impl Future<Output = bool> + Send + '_;

    /// Whether this particular connection may be scrubbed and handed to a
    /// different client, as opposed to being retired after every use.
    fn supports_reuse(&self) -> bool;

    /// Resets session state (temp tables, prepared statements, session
    /// variables) so the connection is safe to hand to an unrelated client.
    ///
    /// Idempotent. A failure here is treated as "this connection cannot be
    /// reused" rather than propagated to any waiting client.
    fn scrub_for_reuse(&mut self) -> impl Future<Output = Result<(), Error>> + Send + '_;

    /// Immediately releases driver-side resources. Consumes the connection.
    fn raw_disconnect(self) -> impl Future<Output = ()> + Send + 'static;
}
