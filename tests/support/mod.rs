//! A small in-memory [`Driver`][cistern::Driver] for exercising `Pool` without a
//! real database. Every knob the integration tests flip lives on [`Shared`],
//! reachable through [`TestDriver::shared`] so a test can mutate behavior after
//! the pool has already been built.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use cistern::{ConnectArgs, Driver, Error, PoolableConnection};

#[derive(Default)]
pub struct Shared {
    connects_attempted: AtomicU32,
    connects_succeeded: AtomicU32,
    disconnects: AtomicU32,
    /// When `true`, the *next* `connect` call fails instead of succeeding.
    fail_next_connect: AtomicBool,
    /// When `true`, the *next* `ping` call (on any connection) reports dead
    /// and resets itself back to `false`.
    fail_next_ping: AtomicBool,
    /// Whether connections produced by this driver claim to support reuse.
    reusable: AtomicBool,
    /// When `true`, `scrub_for_reuse` fails for every connection.
    fail_scrub: AtomicBool,
}

impl Shared {
    pub fn connects_attempted(&self) -> u32 {
        self.connects_attempted.load(Ordering::Acquire)
    }

    pub fn connects_succeeded(&self) -> u32 {
        self.connects_succeeded.load(Ordering::Acquire)
    }

    pub fn disconnects(&self) -> u32 {
        self.disconnects.load(Ordering::Acquire)
    }

    pub fn fail_next_connect(&self) {
        self.fail_next_connect.store(true, Ordering::Release);
    }

    pub fn fail_next_ping(&self) {
        self.fail_next_ping.store(true, Ordering::Release);
    }

    pub fn set_reusable(&self, reusable: bool) {
        self.reusable.store(reusable, Ordering::Release);
    }

    pub fn fail_scrub(&self, fail: bool) {
        self.fail_scrub.store(fail, Ordering::Release);
    }
}

pub struct TestDriver {
    shared: Arc<Shared>,
    next_id: AtomicU64,
}

impl TestDriver {
    pub fn new(reusable: bool) -> Self {
        let shared = Arc::new(Shared::default());
        shared.reusable.store(reusable, Ordering::Release);
        Self {
            shared,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn shared(&self) -> Arc<Shared> {
        Arc::clone(&self.shared)
    }
}

pub struct TestConnection {
    pub id: u64,
    shared: Arc<Shared>,
}

impl Driver for TestDriver {
    type Connection = TestConnection;

    async fn connect(&self, _name: &str, _args: &ConnectArgs) -> Result<Self::Connection, Error> {
        self.shared.connects_attempted.fetch_add(1, Ordering::AcqRel);

        if self
            .shared
            .fail_next_connect
            .swap(false, Ordering::AcqRel)
        {
            return Err(Error::Connect("simulated connect failure".into()));
        }

        self.shared.connects_succeeded.fetch_add(1, Ordering::AcqRel);
        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        Ok(TestConnection {
            id,
            shared: Arc::clone(&self.shared),
        })
    }
}

impl PoolableConnection for TestConnection {
    async fn ping(&mut self) -> bool {
        !self.shared.fail_next_ping.swap(false, Ordering::AcqRel)
    }

    fn supports_reuse(&self) -> bool {
        self.shared.reusable.load(Ordering::Acquire)
    }

    async fn scrub_for_reuse(&mut self) -> Result<(), Error> {
        if self.shared.fail_scrub.load(Ordering::Acquire) {
            Err(Error::Connect("simulated scrub failure".into()))
        } else {
            Ok(())
        }
    }

    async fn raw_disconnect(self) {
        self.shared.disconnects.fetch_add(1, Ordering::AcqRel);
    }
}
