//! `cistern` — a bounded, concurrent pool of database connections, generic
//! over a pluggable [`Driver`].
//!
//! The pool amortizes connection setup, caps concurrent database load at
//! `max_connections`, and hands out connections both synchronously
//! ([`Pool::get_connection`]) and asynchronously
//! ([`Pool::get_connection_async`]). A background maintainer grows the pool on
//! demand, trims idle excess, and replaces connections that fail their
//! liveness check — all lock-free on the fast path, serialized only around
//! opening new connections.
//!
//! Wire protocol, SQL parsing, prepared statements, transaction control, and
//! driver loading are not this crate's concern: everything it knows about "a
//! database" is expressed through the [`Driver`] and [`PoolableConnection`]
//! traits.
#![forbid(unsafe_code)]

mod counters;
mod driver;
mod error;
mod pool;

pub use counters::Stats;
pub use driver::{ConnectArgs, Driver, PoolableConnection};
pub use error::{Error, Result};
pub use pool::{Pool, PoolOptions, PooledConnection};
