//! Exchange session - wires two ports together and drives rounds.

use std::cell::Cell;
use std::rc::Rc;

use contracts::{Arg, Callable, RuntimeConfig};
use event_core::{Listener, ListenerError};
use event_port::{connect, register_port_queue, Port, Scheduler};
use observability::{record_port_stats, ExchangeAggregator};
use queue::QueueProtocol;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::stats::{ExchangeReport, PortReport};
use crate::error::Result;

/// Exchange configuration
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Port and scheduler settings
    pub runtime: RuntimeConfig,

    /// Number of rounds
    pub rounds: u32,

    /// Pings emitted per round
    pub burst: u32,
}

/// Two connected ports: content answers every `ping` with a `pong`
pub struct Exchange {
    config: ExchangeConfig,
    scheduler: Scheduler,
    addon: Port,
    content: Port,
    queue: QueueProtocol<Value>,
    pongs: Rc<Cell<u64>>,
}

impl Exchange {
    pub fn new(config: ExchangeConfig) -> Self {
        let scheduler = Scheduler::with_config(config.runtime.scheduler.clone());
        let addon = Port::with_config(&scheduler, config.runtime.port.clone().with_label("addon"));
        let content =
            Port::with_config(&scheduler, config.runtime.port.clone().with_label("content"));

        let reply = content.clone();
        content.emitter().on(
            "ping",
            Listener::new(move |args| {
                let seq = args.first().map_or(Value::Null, |ping| ping["seq"].clone());
                reply
                    .emit("pong", vec![Arg::from(json!({ "seq": seq }))])
                    .map_err(|e| ListenerError::new(e.to_string()))
            }),
        );

        let pongs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pongs);
        addon.emitter().on(
            "pong",
            Listener::infallible(move |_| counter.set(counter.get() + 1)),
        );

        let queue = QueueProtocol::new();
        register_port_queue(&queue);

        Self {
            config,
            scheduler,
            addon,
            content,
            queue,
            pongs,
        }
    }

    fn delivered(&self) -> u64 {
        self.addon.metrics().delivered + self.content.metrics().delivered
    }

    /// Run every round, then close both ports
    pub async fn run(&mut self) -> Result<ExchangeReport> {
        connect(&self.addon, &self.content)?;
        info!(
            addon = %self.addon.id(),
            content = %self.content.id(),
            rounds = self.config.rounds,
            burst = self.config.burst,
            "Exchange started"
        );

        let mut aggregator = ExchangeAggregator::new();
        let mut pings_sent = 0u64;
        let mut overflowed = 0u64;

        for round in 0..self.config.rounds {
            let before = self.delivered();

            for i in 0..self.config.burst {
                let seq = u64::from(round) * u64::from(self.config.burst) + u64::from(i);
                // The reply callable never crosses the port
                let ping = vec![
                    Arg::from(json!({ "seq": seq, "round": round })),
                    Arg::from(Callable::new(|_| Value::Null)),
                ];
                match self.addon.emit("ping", ping) {
                    Ok(()) => pings_sent += 1,
                    Err(e) if e.is_overflow() => {
                        overflowed += 1;
                        warn!(round, seq, error = %e, "Ping rejected");
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            let ticks = self.scheduler.drive().await?;
            aggregator.update_round(ticks, self.delivered() - before);
            debug!(round, ticks, pongs = self.pongs.get(), "Round complete");
        }

        self.addon.close()?;
        self.content.close()?;

        let addon = self.port_report(&self.addon, &mut aggregator)?;
        let content = self.port_report(&self.content, &mut aggregator)?;

        let report = ExchangeReport {
            rounds: self.config.rounds,
            pings_sent,
            pongs_received: self.pongs.get(),
            overflowed,
            ticks: self.scheduler.total_ticks(),
            addon,
            content,
            summary: aggregator.summary(),
        };

        info!(
            pings = report.pings_sent,
            pongs = report.pongs_received,
            overflowed = report.overflowed,
            ticks = report.ticks,
            "Exchange finished"
        );
        Ok(report)
    }

    fn port_report(&self, port: &Port, aggregator: &mut ExchangeAggregator) -> Result<PortReport> {
        let stats = port.metrics();
        record_port_stats(port.label(), &stats);
        aggregator.update_port(port.label(), stats);

        let queued = self
            .queue
            .is_queued
            .call(port, ())
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(PortReport { stats, queued })
    }
}

impl Drop for Exchange {
    fn drop(&mut self) {
        // Listeners hold port handles
        self.addon.destroy();
        self.content.destroy();
    }
}
