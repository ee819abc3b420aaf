//! Per-port counters

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::PortStats;

/// Counters for a single port
#[derive(Debug, Default)]
pub struct PortMetrics {
    /// Events accepted by `emit`
    emitted: AtomicU64,
    /// Events handed to the target
    delivered: AtomicU64,
    /// Emits rejected by a full buffer
    overflowed: AtomicU64,
    /// Callables dropped during serialization
    dropped_callables: AtomicU64,
}

impl PortMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn inc_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn overflowed(&self) -> u64 {
        self.overflowed.load(Ordering::Relaxed)
    }

    pub fn inc_overflowed(&self) {
        self.overflowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_callables(&self) -> u64 {
        self.dropped_callables.load(Ordering::Relaxed)
    }

    pub fn add_dropped_callables(&self, count: usize) {
        self.dropped_callables
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Snapshot of all counters, with the current buffer depth
    pub fn snapshot(&self, pending: usize) -> PortStats {
        PortStats {
            emitted: self.emitted(),
            delivered: self.delivered(),
            overflowed: self.overflowed(),
            dropped_callables: self.dropped_callables(),
            pending,
        }
    }
}
