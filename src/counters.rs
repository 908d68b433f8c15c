//! Atomic tallies backing [`Pool::stats`][crate::Pool::stats].
//!
//! Every counter is a plain atomic integer updated with independent
//! read-modify-write operations; no lock is ever held while a counter is
//! touched. `spec.md` §3 tolerates brief overshoot of the
//! `idle + starting + inuse + scrub <= max_connections` invariant during the
//! `inuse--`/`scrub++` handoff inside the reuse path, and callers of
//! [`Stats`] should expect the same kind of momentary inconsistency.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// A point-in-time snapshot of a pool's counters.
///
/// Field names match `spec.md` §4.7 exactly: `inuse, idle, starting, scrub,
/// total, waiting`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Stats {
    pub inuse: u32,
    pub idle: u32,
    pub starting: u32,
    pub scrub: u32,
    pub total: u32,
    pub waiting: u32,
}

#[derive(Default)]
pub(crate) struct Counters {
    starting: AtomicU32,
    idle: AtomicU32,
    inuse: AtomicU32,
    scrub: AtomicU32,
    waiting: AtomicU32,

    /// Low-water mark of `idle` since the last prune cycle. Updated with a
    /// conditional "only decrease" store during handouts; deliberately racy
    /// (spec.md §5, "Low-water mark approximation").
    min_idle_since_last_check: AtomicU32,

    /// Connections whose wrapper was dropped without a call to `dispose()`.
    destroyed_without_dispose: AtomicU64,

    /// Set once any connection this pool ever opened reported
    /// `supports_reuse() == true`. Gates the teardown warning in spec.md §4.2.
    any_reusable: std::sync::atomic::AtomicBool,
}

impl Counters {
    pub(crate) fn starting_inc(&self) {
        self.starting.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn starting_dec(&self) {
        self.starting.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn idle_inc(&self) {
        self.idle.fetch_add(1, Ordering::AcqRel);
    }

    /// Plain decrement, used when the maintainer retires an idle connection
    /// directly (the low-water mark is reset wholesale once per tick instead).
    pub(crate) fn idle_dec(&self) {
        self.idle.fetch_sub(1, Ordering::AcqRel);
    }

    /// Decrements `idle` and folds the new value into the low-water mark.
    pub(crate) fn idle_dec_and_track_low_water(&self) {
        let new_idle = self.idle.fetch_sub(1, Ordering::AcqRel) - 1;
        self.track_low_water(new_idle);
    }

    fn track_low_water(&self, observed_idle: u32) {
        let _ = self
            .min_idle_since_last_check
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |low| {
                (observed_idle < low).then_some(observed_idle)
            });
    }

    pub(crate) fn idle(&self) -> u32 {
        self.idle.load(Ordering::Acquire)
    }

    pub(crate) fn waiting(&self) -> u32 {
        self.waiting.load(Ordering::Acquire)
    }

    pub(crate) fn inuse_inc(&self) {
        self.inuse.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn inuse_dec(&self) {
        self.inuse.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn scrub_inc(&self) {
        self.scrub.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn scrub_dec(&self) {
        self.scrub.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn waiting_inc(&self) {
        self.waiting.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn waiting_dec(&self) {
        self.waiting.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn destroyed_without_dispose_inc(&self) {
        self.destroyed_without_dispose.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn destroyed_without_dispose(&self) -> u64 {
        self.destroyed_without_dispose.load(Ordering::Acquire)
    }

    pub(crate) fn mark_reusable_seen(&self) {
        self.any_reusable.store(true, Ordering::Release);
    }

    pub(crate) fn any_reusable(&self) -> bool {
        self.any_reusable.load(Ordering::Acquire)
    }

    /// Reads the low-water mark observed since the last reset, without
    /// touching it. The maintainer reads this *before* trimming so the trim
    /// count reflects the window that just elapsed.
    pub(crate) fn low_water(&self) -> u32 {
        self.min_idle_since_last_check.load(Ordering::Acquire)
    }

    /// Resets the low-water mark to the current (post-trim) `idle` count, so
    /// the next window starts from where this one actually left off. Called
    /// once per maintainer tick, after trimming.
    pub(crate) fn reset_low_water(&self) {
        let current_idle = self.idle.load(Ordering::Acquire);
        self.min_idle_since_last_check
            .store(current_idle, Ordering::Release);
    }

    pub(crate) fn total(&self) -> u32 {
        self.starting.load(Ordering::Acquire)
            + self.idle.load(Ordering::Acquire)
            + self.inuse.load(Ordering::Acquire)
            + self.scrub.load(Ordering::Acquire)
    }

    pub(crate) fn snapshot(&self) -> Stats {
        let starting = self.starting.load(Ordering::Acquire);
        let idle = self.idle.load(Ordering::Acquire);
        let inuse = self.inuse.load(Ordering::Acquire);
        let scrub = self.scrub.load(Ordering::Acquire);

        Stats {
            starting,
            idle,
            inuse,
            scrub,
            total: starting + idle + inuse + scrub,
            waiting: self.waiting.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Counters;

    #[test]
    fn snapshot_reflects_every_counter() {
        let counters = Counters::default();
        counters.idle_inc();
        counters.idle_inc();
        counters.inuse_inc();
        counters.starting_inc();
        counters.waiting_inc();

        let stats = counters.snapshot();
        assert_eq!(stats.idle, 2);
        assert_eq!(stats.inuse, 1);
        assert_eq!(stats.starting, 1);
        assert_eq!(stats.scrub, 0);
        assert_eq!(stats.waiting, 1);
        assert_eq!(stats.total, 4);
    }

    #[test]
    fn low_water_mark_only_decreases_between_resets() {
        let counters = Counters::default();
        for _ in 0..3 {
            counters.idle_inc();
        }
        // Seed the mark against the current idle count, as the maintainer
        // does after its initial injection (see pool/maintainer.rs).
        counters.reset_low_water();

        // Dropping to 1 then back up to 2 should leave the mark at 1: it
        // tracks the minimum observed, not the latest value.
        counters.idle_dec_and_track_low_water();
        counters.idle_dec_and_track_low_water();
        counters.idle_inc();

        assert_eq!(counters.low_water(), 1);
        // `reset_low_water` is a separate step, taken *after* the mark has
        // been read and any trimming has happened — it rebases the mark to
        // the current (post-trim) `idle` value (2) for the next window.
        counters.reset_low_water();
        counters.idle_dec_and_track_low_water();
        assert_eq!(counters.low_water(), 1);
    }

    #[test]
    fn destroyed_without_dispose_is_independent_of_reuse_support() {
        let counters = Counters::default();
        assert!(!counters.any_reusable());
        assert_eq!(counters.destroyed_without_dispose(), 0);

        counters.destroyed_without_dispose_inc();
        counters.mark_reusable_seen();

        assert_eq!(counters.destroyed_without_dispose(), 1);
        assert!(counters.any_reusable());
    }
}
