//! Error and `Result` types.

/// A specialized `Result` type for `cistern`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong acquiring, maintaining, or tearing down a pool.
///
/// Most connection-level failures (a dead `ping`, a failed `scrub_for_reuse`,
/// a transient `connect` error during background injection) are handled
/// internally by the pool and never reach a caller as an `Error` — see
/// `spec.md` §7. The variants here are exactly the ones that are meant to be
/// user-visible.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// [`Driver::connect`][crate::Driver::connect] failed while satisfying an
    /// inline (async) acquisition request. Background injection failures are
    /// logged and retried instead of being surfaced this way.
    #[error("error establishing a new connection: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// [`Pool::dispose`][crate::Pool::dispose] has been called; no new
    /// connections will be started, and `get_connection` fails fast instead of
    /// blocking forever.
    #[error("the pool has been terminated")]
    PoolTerminated,

    /// The pool was constructed with `initial_size > max_connections`.
    #[error("invalid pool configuration: {0}")]
    InvalidConfiguration(&'static str),
}
