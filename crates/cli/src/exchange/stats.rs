//! Exchange report.

use contracts::PortStats;
use observability::ExchangeSummary;
use serde::Serialize;

/// Final counters of one port
#[derive(Debug, Clone, Serialize)]
pub struct PortReport {
    #[serde(flatten)]
    pub stats: PortStats,

    /// `is_queued` as reported through the queue protocol
    pub queued: bool,
}

/// Outcome of an exchange run
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeReport {
    pub rounds: u32,
    pub pings_sent: u64,
    pub pongs_received: u64,
    pub overflowed: u64,
    pub ticks: u64,
    pub addon: PortReport,
    pub content: PortReport,

    #[serde(skip)]
    pub summary: ExchangeSummary,
}

impl ExchangeReport {
    /// Percentage of sent pings that came back
    pub fn round_trip_rate(&self) -> f64 {
        if self.pings_sent > 0 {
            self.pongs_received as f64 / self.pings_sent as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Exchange Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Rounds: {}", self.rounds);
        println!("   ├─ Pings sent: {}", self.pings_sent);
        println!(
            "   ├─ Pongs received: {} ({:.2}%)",
            self.pongs_received,
            self.round_trip_rate()
        );
        println!("   ├─ Overflowed: {}", self.overflowed);
        println!("   └─ Scheduler ticks: {}", self.ticks);

        for (name, port) in [("addon", &self.addon), ("content", &self.content)] {
            println!("\n🔌 Port {name}");
            println!("   ├─ Emitted: {}", port.stats.emitted);
            println!("   ├─ Delivered: {}", port.stats.delivered);
            println!("   ├─ Overflowed: {}", port.stats.overflowed);
            println!("   ├─ Dropped callables: {}", port.stats.dropped_callables);
            println!(
                "   └─ Pending: {} (queued: {})",
                port.stats.pending, port.queued
            );
        }

        println!("\n{}", self.summary);
    }
}
