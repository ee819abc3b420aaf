//! In-process exchange between an "addon" and a "content" port.

mod session;
mod stats;

pub use session::{Exchange, ExchangeConfig};
pub use stats::{ExchangeReport, PortReport};
