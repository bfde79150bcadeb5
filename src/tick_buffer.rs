use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::TickRejection;
use crate::model::tick::Tick;

/// Bounded, arrival-ordered tick store shared between one ingesting writer
/// and any number of snapshot readers.
///
/// `append` is the only mutation. When the store is full the oldest tick is
/// dropped silently; order is never changed. Readers get owned copies, so a
/// pull cycle keeps working on its snapshot while ingestion continues.
#[derive(Debug)]
pub struct TickBuffer {
    capacity: usize,
    inner: RwLock<Inner>,
    rejected: AtomicU64,
}

#[derive(Debug)]
struct Inner {
    ticks: VecDeque<Tick>,
    // Ticks ever admitted; the arrival sequence of the next tick.
    accepted: u64,
    evicted: u64,
    last_timestamp_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStats {
    pub len: usize,
    pub capacity: usize,
    pub accepted: u64,
    pub rejected: u64,
    pub evicted: u64,
    pub last_timestamp_ms: Option<u64>,
}

/// Point-in-time copy of a buffer. `ticks()[i]` has arrival sequence
/// `first_seq() + i`.
#[derive(Debug, Clone, Default)]
pub struct BufferSnapshot {
    ticks: Vec<Tick>,
    first_seq: u64,
}

impl BufferSnapshot {
    pub fn new(ticks: Vec<Tick>, first_seq: u64) -> Self {
        Self { ticks, first_seq }
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn first_seq(&self) -> u64 {
        self.first_seq
    }

    /// Sequence number the next appended tick will receive.
    pub fn end_seq(&self) -> u64 {
        self.first_seq + self.ticks.len() as u64
    }

    /// Last `n` ticks, or all of them when fewer are held.
    pub fn tail(&self, n: usize) -> &[Tick] {
        let start = self.ticks.len().saturating_sub(n);
        &self.ticks[start..]
    }

    pub fn last(&self) -> Option<&Tick> {
        self.ticks.last()
    }
}

impl TickBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "tick buffer capacity must be > 0");
        Self {
            capacity,
            inner: RwLock::new(Inner {
                ticks: VecDeque::with_capacity(capacity),
                accepted: 0,
                evicted: 0,
                last_timestamp_ms: None,
            }),
            rejected: AtomicU64::new(0),
        }
    }

    /// Admit a tick at the tail, evicting from the head past capacity.
    pub fn append(&self, tick: Tick) -> Result<(), TickRejection> {
        if let Err(reason) = tick.validate() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(reason);
        }

        let mut inner = self.inner.write();
        inner.last_timestamp_ms = Some(tick.timestamp_ms);
        inner.ticks.push_back(tick);
        inner.accepted += 1;
        while inner.ticks.len() > self.capacity {
            inner.ticks.pop_front();
            inner.evicted += 1;
        }
        Ok(())
    }

    /// Count a tick refused before it could be built (e.g. malformed feed message).
    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        Self::copy_ticks(&self.inner.read())
    }

    /// Ticks and counters read under one lock, so `stats.len == snapshot.len()`.
    pub fn snapshot_with_stats(&self) -> (BufferSnapshot, BufferStats) {
        let inner = self.inner.read();
        (Self::copy_ticks(&inner), self.stats_of(&inner))
    }

    fn copy_ticks(inner: &Inner) -> BufferSnapshot {
        BufferSnapshot {
            ticks: inner.ticks.iter().cloned().collect(),
            first_seq: inner.accepted - inner.ticks.len() as u64,
        }
    }

    /// Last `n` ticks, or the whole buffer when it holds fewer than `n`.
    pub fn tail(&self, n: usize) -> Vec<Tick> {
        let inner = self.inner.read();
        let skip = inner.ticks.len().saturating_sub(n);
        inner.ticks.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().ticks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> BufferStats {
        self.stats_of(&self.inner.read())
    }

    fn stats_of(&self, inner: &Inner) -> BufferStats {
        BufferStats {
            len: inner.ticks.len(),
            capacity: self.capacity,
            accepted: inner.accepted,
            rejected: self.rejected.load(Ordering::Relaxed),
            evicted: inner.evicted,
            last_timestamp_ms: inner.last_timestamp_ms,
        }
    }
}
