//! PortStats - per-port counters shared with observability

use serde::{Deserialize, Serialize};

/// Snapshot of a port's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortStats {
    /// Events accepted by `emit`
    pub emitted: u64,
    /// Events delivered to a target
    pub delivered: u64,
    /// Emits rejected because the buffer was full
    pub overflowed: u64,
    /// Callables dropped while serializing payloads
    pub dropped_callables: u64,
    /// Events currently buffered
    pub pending: usize,
}

impl PortStats {
    /// Events accepted but not delivered yet (or discarded)
    pub fn undelivered(&self) -> u64 {
        self.emitted.saturating_sub(self.delivered)
    }
}
