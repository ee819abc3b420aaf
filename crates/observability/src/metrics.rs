//! Port and scheduler metrics.
//!
//! `record_*` functions feed the global `metrics` recorder (Prometheus when
//! installed, no-op otherwise). [`ExchangeAggregator`] keeps an in-memory
//! summary for reporting.

use std::collections::BTreeMap;

use contracts::PortStats;
use metrics::{counter, gauge, histogram};

/// Record one event accepted by a port
pub fn record_event_emitted(port: &str) {
    counter!("event_port_events_emitted_total", "port" => port.to_string()).increment(1);
}

/// Record events delivered to a port's target by one flush
pub fn record_events_delivered(port: &str, count: usize) {
    if count == 0 {
        return;
    }
    counter!("event_port_events_delivered_total", "port" => port.to_string())
        .increment(count as u64);
    histogram!("event_port_flush_batch_size").record(count as f64);
}

/// Record an emit rejected by a full buffer
pub fn record_overflow(port: &str) {
    counter!("event_port_overflow_total", "port" => port.to_string()).increment(1);
}

/// Record the current buffer depth of a port
pub fn record_buffer_depth(port: &str, depth: usize) {
    gauge!("event_port_buffer_depth", "port" => port.to_string()).set(depth as f64);
}

/// Record one scheduler tick and the number of tasks it ran
pub fn record_scheduler_tick(tasks: usize) {
    counter!("event_port_scheduler_ticks_total").increment(1);
    histogram!("event_port_scheduler_tasks_per_tick").record(tasks as f64);
}

/// Publish a port's counters as gauges
pub fn record_port_stats(port: &str, stats: &PortStats) {
    gauge!("event_port_emitted", "port" => port.to_string()).set(stats.emitted as f64);
    gauge!("event_port_delivered", "port" => port.to_string()).set(stats.delivered as f64);
    gauge!("event_port_overflowed", "port" => port.to_string()).set(stats.overflowed as f64);
    gauge!("event_port_buffer_depth", "port" => port.to_string()).set(stats.pending as f64);
}

/// Exchange metrics aggregator.
///
/// Collects per-round samples and final per-port counters.
#[derive(Debug, Clone, Default)]
pub struct ExchangeAggregator {
    /// Completed rounds
    pub rounds: u64,

    /// Scheduler ticks needed per round
    pub tick_stats: RunningStats,

    /// Events delivered per round
    pub delivered_stats: RunningStats,

    /// Latest counters per port label
    pub ports: BTreeMap<String, PortStats>,
}

impl ExchangeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished round
    pub fn update_round(&mut self, ticks: usize, delivered: u64) {
        self.rounds += 1;
        self.tick_stats.push(ticks as f64);
        self.delivered_stats.push(delivered as f64);
    }

    /// Replace the counters of `port`
    pub fn update_port(&mut self, port: &str, stats: PortStats) {
        self.ports.insert(port.to_string(), stats);
    }

    pub fn summary(&self) -> ExchangeSummary {
        let total_emitted: u64 = self.ports.values().map(|s| s.emitted).sum();
        let total_delivered: u64 = self.ports.values().map(|s| s.delivered).sum();
        let total_overflowed: u64 = self.ports.values().map(|s| s.overflowed).sum();

        ExchangeSummary {
            rounds: self.rounds,
            total_emitted,
            total_delivered,
            total_overflowed,
            delivery_rate: if total_emitted > 0 {
                total_delivered as f64 / total_emitted as f64 * 100.0
            } else {
                0.0
            },
            ticks_per_round: StatsSummary::from(&self.tick_stats),
            delivered_per_round: StatsSummary::from(&self.delivered_stats),
            ports: self.ports.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Exchange summary
#[derive(Debug, Clone, Default)]
pub struct ExchangeSummary {
    pub rounds: u64,
    pub total_emitted: u64,
    pub total_delivered: u64,
    pub total_overflowed: u64,
    pub delivery_rate: f64,
    pub ticks_per_round: StatsSummary,
    pub delivered_per_round: StatsSummary,
    pub ports: BTreeMap<String, PortStats>,
}

impl std::fmt::Display for ExchangeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Exchange Summary ===")?;
        writeln!(f, "Rounds: {}", self.rounds)?;
        writeln!(f, "Emitted: {}", self.total_emitted)?;
        writeln!(
            f,
            "Delivered: {} ({:.2}%)",
            self.total_delivered, self.delivery_rate
        )?;
        writeln!(f, "Overflowed: {}", self.total_overflowed)?;
        writeln!(f, "Ticks per round: {}", self.ticks_per_round)?;
        writeln!(f, "Delivered per round: {}", self.delivered_per_round)?;

        if !self.ports.is_empty() {
            writeln!(f, "Ports:")?;
            for (port, stats) in &self.ports {
                writeln!(
                    f,
                    "  {}: emitted={} delivered={} overflowed={} pending={}",
                    port, stats.emitted, stats.delivered, stats.overflowed, stats.pending
                )?;
            }
        }

        Ok(())
    }
}

/// Summary of a [`RunningStats`]
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
