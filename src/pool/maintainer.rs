//! Background injection and idle-trim loop (`spec.md` §4.5).

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::driver::{Driver, PoolableConnection};
use crate::pool::inner::{PoolInner, MAINTAINER_STARTUP_DELAY};

/// Runs for the lifetime of a pool: opens `initial_size` connections once,
/// then repeatedly sleeps `max_idle_duration` and trims idle connections down
/// to `min_spare_connections`, using the low-water mark observed since the
/// previous tick.
pub(crate) async fn run<D: Driver>(pool: Arc<PoolInner<D>>) {
    tokio::time::sleep(MAINTAINER_STARTUP_DELAY).await;

    pool.inject_initial().await;

    // Seed the low-water mark against the just-injected baseline so the first
    // tick doesn't see a stale `0` and trim everything.
    pool.counters.reset_low_water();

    loop {
        tokio::time::sleep(pool.options().max_idle_duration).await;

        if pool.terminate.load(Ordering::Acquire) {
            return;
        }

        let min_idle_since_last_check = pool.counters.low_water();
        let kill = min_idle_since_last_check.saturating_sub(pool.options().min_spare_connections);

        for _ in 0..kill {
            match pool.idle.poll() {
                Some(idle) => {
                    pool.counters.idle_dec();
                    idle.conn.raw_disconnect().await;
                    tracing::trace!("idle connection trimmed");
                }
                None => break,
            }
        }

        // Reset *after* trimming so the next window's baseline is the
        // post-trim idle count, not the stale pre-trim one (spec.md §4.5).
        pool.counters.reset_low_water();
    }
}
