//! The MPMC handoff queue of ready-to-use connections (`spec.md` §4.3).

use crossbeam_queue::ArrayQueue;
use event_listener::Event;
use std::time::Instant;

/// A connection sitting idle, tagged with when it was returned.
pub(crate) struct Idle<C> {
    pub(crate) conn: C,
    pub(crate) since: Instant,
}

/// Multi-producer, multi-consumer FIFO handoff queue of idle connections.
///
/// Bounding comes entirely from `max_connections` (the pool never offers more
/// connections than it has opened); the queue itself is sized to that cap and
/// `offer` never blocks or fails.
pub(crate) struct IdleQueue<C> {
    queue: ArrayQueue<Idle<C>>,
    released: Event,
}

impl<C> IdleQueue<C> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
            released: Event::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Never blocks, never fails. Capacity is guaranteed by the counters
    /// (`idle + starting + inuse + scrub <= max_connections`), so a full
    /// queue indicates a counting bug upstream rather than a normal condition.
    pub(crate) fn offer(&self, conn: C) {
        let idle = Idle {
            conn,
            since: Instant::now(),
        };

        if self.queue.push(idle).is_err() {
            unreachable!("BUG: idle queue capacity exceeded max_connections");
        }

        self.released.notify(1usize);
    }

    /// Non-blocking. Returns `None` immediately if the queue is empty.
    pub(crate) fn poll(&self) -> Option<Idle<C>> {
        self.queue.pop()
    }

    /// Blocks the current thread until a connection is available or
    /// `is_terminated` starts returning `true`, whichever comes first.
    ///
    /// Used by the synchronous `Pool::get_connection`. Relies on
    /// `event_listener::EventListener` implementing a blocking `.wait()` so
    /// the same [`Event`] serves both this path and [`Self::receive_async`].
    pub(crate) fn receive_blocking(&self, is_terminated: impl Fn() -> bool) -> Option<Idle<C>> {
        loop {
            if let Some(conn) = self.poll() {
                return Some(conn);
            }

            if is_terminated() {
                return None;
            }

            let listener = self.released.listen();

            // Re-check after registering the listener to close the race
            // between the emptiness check above and the listener being armed.
            if let Some(conn) = self.poll() {
                return Some(conn);
            }

            if is_terminated() {
                return None;
            }

            listener.wait();
        }
    }

    /// Async counterpart of [`Self::receive_blocking`].
    pub(crate) async fn receive_async(&self, is_terminated: impl Fn() -> bool) -> Option<Idle<C>> {
        loop {
            if let Some(conn) = self.poll() {
                return Some(conn);
            }

            if is_terminated() {
                return None;
            }

            let listener = self.released.listen();

            if let Some(conn) = self.poll() {
                return Some(conn);
            }

            if is_terminated() {
                return None;
            }

            listener.await;
        }
    }

    /// Wakes every thread/task currently parked in `receive_*`, used when the
    /// pool terminates so no waiter is left blocked forever.
    pub(crate) fn wake_all(&self) {
        self.released.notify(usize::MAX);
    }
}
