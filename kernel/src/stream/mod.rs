// Mock Stream Source
//
// Simulates a live record feed: a connect delay, then batches of
// synthetic records at irregular intervals. Everything is driven by an
// explicit `now` and a seeded RNG, so runs are reproducible and tests
// never sleep. The transport trait is the substitution seam: tests and
// alternate backends implement it instead of patching the mock.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::record::{Level, Record};

/// Capability interface for a record source.
///
/// Implementations own their connection lifecycle; the consumer only
/// opens, closes, and polls. `poll` returns the records produced since
/// the previous poll (empty while disconnected or still connecting).
pub trait StreamTransport {
    fn open(&mut self, now: Instant);
    fn close(&mut self);
    fn is_connected(&self) -> bool;
    fn poll(&mut self, now: Instant) -> Vec<Record>;
}

/// Latest-callback indirection cell.
///
/// A long-lived producer holds the cell and dereferences it at call
/// time, so replacing the callback mid-stream takes effect on the very
/// next record instead of the one captured at connect time.
#[derive(Clone, Default)]
pub struct RecordSink {
    inner: Arc<Mutex<Option<Box<dyn FnMut(&Record) + Send>>>>,
}

impl RecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current callback.
    pub fn set(&self, callback: impl FnMut(&Record) + Send + 'static) {
        *self.inner.lock().unwrap() = Some(Box::new(callback));
    }

    /// Remove the callback (teardown).
    pub fn clear(&self) {
        *self.inner.lock().unwrap() = None;
    }

    /// Invoke whichever callback is current right now, if any.
    pub fn emit(&self, record: &Record) {
        if let Some(callback) = self.inner.lock().unwrap().as_mut() {
            callback(record);
        }
    }
}

impl std::fmt::Debug for RecordSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let installed = self.inner.lock().map(|g| g.is_some()).unwrap_or(false);
        f.debug_struct("RecordSink")
            .field("installed", &installed)
            .finish()
    }
}

/// Generation parameters for the mock feed.
#[derive(Debug, Clone)]
pub struct MockStreamConfig {
    /// Simulated connection-open delay.
    pub connect_delay: Duration,
    /// Bounds for the gap between emissions.
    pub min_interval: Duration,
    pub max_interval: Duration,
    /// Bounds for records per emission.
    pub min_batch: usize,
    pub max_batch: usize,
    /// Epoch milliseconds assigned to the first record.
    pub base_timestamp_ms: u64,
    /// RNG seed; equal seeds produce equal feeds.
    pub seed: u64,
}

impl Default for MockStreamConfig {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_millis(300),
            min_interval: Duration::from_millis(20),
            max_interval: Duration::from_millis(400),
            min_batch: 1,
            max_batch: 4,
            base_timestamp_ms: 1_700_000_000_000,
            seed: 0,
        }
    }
}

#[derive(Debug)]
enum Connection {
    Closed,
    Opening { ready_at: Instant },
    Open { next_emit: Instant },
}

const SUBSYSTEMS: [&str; 6] = ["auth", "billing", "cache", "ingest", "scheduler", "storage"];

const TEMPLATES: [(Level, &str); 8] = [
    (Level::Debug, "request trace id assigned"),
    (Level::Info, "request completed"),
    (Level::Info, "session established"),
    (Level::Info, "cache refreshed"),
    (Level::Warn, "response time above threshold"),
    (Level::Warn, "retrying after transient failure"),
    (Level::Error, "upstream connection refused"),
    (Level::Error, "write failed, giving up"),
];

/// Deterministic synthetic record feed.
#[derive(Debug)]
pub struct MockStream {
    config: MockStreamConfig,
    connection: Connection,
    rng: StdRng,
    sequence: u64,
    clock_ms: u64,
}

impl MockStream {
    pub fn new(config: MockStreamConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let clock_ms = config.base_timestamp_ms;
        Self {
            config,
            connection: Connection::Closed,
            rng,
            sequence: 0,
            clock_ms,
        }
    }

    fn next_record(&mut self) -> Record {
        self.sequence += 1;
        let (level, text) = TEMPLATES[self.rng.gen_range(0..TEMPLATES.len())];
        let subsystem = SUBSYSTEMS[self.rng.gen_range(0..SUBSYSTEMS.len())];
        // Timestamps advance with the simulated clock, jittered so
        // records inside one batch are not all identical.
        self.clock_ms += self.rng.gen_range(0..3);
        Record::new(
            level,
            self.clock_ms,
            format!("[{subsystem}] {text} (#{})", self.sequence),
        )
    }

    fn emit_batch(&mut self) -> Vec<Record> {
        let size = self
            .rng
            .gen_range(self.config.min_batch..=self.config.max_batch.max(self.config.min_batch));
        (0..size).map(|_| self.next_record()).collect()
    }

    fn next_gap(&mut self) -> Duration {
        let min = self.config.min_interval.as_millis() as u64;
        let max = self.config.max_interval.as_millis() as u64;
        // At least 1 ms: a zero gap would leave `poll`'s emission
        // deadline stuck in the past and the drain loop spinning.
        let gap = self.rng.gen_range(min..=max.max(min)).max(1);
        Duration::from_millis(gap)
    }
}

impl StreamTransport for MockStream {
    /// Begin connecting; the feed opens after the configured delay.
    fn open(&mut self, now: Instant) {
        if matches!(self.connection, Connection::Closed) {
            self.connection = Connection::Opening {
                ready_at: now + self.config.connect_delay,
            };
        }
    }

    /// Drop the connection. A pending open is discarded too, so a
    /// close during the connect delay never produces a late open.
    fn close(&mut self) {
        self.connection = Connection::Closed;
    }

    fn is_connected(&self) -> bool {
        matches!(self.connection, Connection::Open { .. })
    }

    fn poll(&mut self, now: Instant) -> Vec<Record> {
        if let Connection::Opening { ready_at } = self.connection {
            if now >= ready_at {
                self.connection = Connection::Open { next_emit: ready_at };
            }
        }

        let mut due = match self.connection {
            Connection::Open { next_emit } => next_emit,
            _ => return Vec::new(),
        };

        let mut records = Vec::new();
        while due <= now {
            self.clock_ms += self.next_gap().as_millis() as u64 / 4;
            records.extend(self.emit_batch());
            due += self.next_gap();
        }
        self.connection = Connection::Open { next_emit: due };
        records
    }
}
