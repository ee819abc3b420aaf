//! # Event Port
//!
//! Buffered, switchable links between event emitters.
//!
//! Responsibilities:
//! - Buffer emitted events as plain data while a port is closed
//! - Deliver them to the target port's listeners on the next scheduler tick
//!   once open, or immediately on `flush`
//! - Drive deferred work through a single-threaded [`Scheduler`]
//!
//! ## Example
//!
//! ```
//! use contracts::args;
//! use event_core::Listener;
//! use event_port::{connect, Port, Scheduler};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let scheduler = Scheduler::new();
//! let addon = Port::new(&scheduler);
//! let content = Port::new(&scheduler);
//!
//! let hits = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&hits);
//! content.emitter().on("hello", Listener::infallible(move |_| counter.set(counter.get() + 1)));
//!
//! connect(&addon, &content).unwrap();
//! addon.emit("hello", args!["world"]).unwrap();
//! assert_eq!(hits.get(), 0);
//!
//! scheduler.run_until_idle().unwrap();
//! assert_eq!(hits.get(), 1);
//! ```

mod error;
mod metrics;
mod port;
mod protocol;
mod scheduler;

pub use error::{PortError, SchedulerError};
pub use metrics::PortMetrics;
pub use port::{connect, Port, PORT};
pub use protocol::register_port_queue;
pub use scheduler::Scheduler;

pub use contracts::PortStats;
