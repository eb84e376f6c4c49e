//! In-memory [`Store`] used by the test harness.
//!
//! Exposes inspection and fault-injection hooks. Only compiled for unit tests
//! and with the `test-util` feature, which the dev-dependencies turn on.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::domain::Transaction;
use crate::ports::{Store, StoreError, StoreResult};

#[derive(Default)]
struct State {
    transactions: Vec<Transaction>,
    closed: bool,
    insert_error: Option<StoreError>,
    ping_error: Option<StoreError>,
    latency: Option<Duration>,
    insert_calls: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `insert` fails with `err` and records nothing.
    pub fn fail_next_insert(&self, err: StoreError) {
        self.state.lock().insert_error = Some(err);
    }

    /// The next `ping` fails with `err`.
    pub fn fail_next_ping(&self, err: StoreError) {
        self.state.lock().ping_error = Some(err);
    }

    /// Delay every `insert` and `ping` by `latency` before it takes effect.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = Some(latency);
    }

    /// Snapshot of every recorded transaction, in insertion order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().transactions.clone()
    }

    /// Number of `insert` calls observed, including failed ones.
    pub fn insert_calls(&self) -> usize {
        self.state.lock().insert_calls
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Drops all records, pending faults and the closed flag.
    pub fn reset(&self) {
        *self.state.lock() = State::default();
    }

    async fn simulate_latency(&self) {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, tx: Transaction) -> StoreResult<()> {
        self.state.lock().insert_calls += 1;
        self.simulate_latency().await;

        let mut state = self.state.lock();
        if let Some(err) = state.insert_error.take() {
            return Err(err);
        }
        if state.closed {
            return Err(StoreError::Closed);
        }

        state.transactions.push(tx);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.simulate_latency().await;

        let mut state = self.state.lock();
        if let Some(err) = state.ping_error.take() {
            return Err(err);
        }
        if state.closed {
            return Err(StoreError::Closed);
        }

        Ok(())
    }

    async fn close(&self) {
        self.state.lock().closed = true;
    }
}
