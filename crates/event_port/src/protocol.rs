//! Queue protocol binding for ports

use method::DispatchError;
use queue::QueueProtocol;

use crate::port::{Port, PORT};

/// Make `is_queued` report whether a port has buffered events.
///
/// Only `is_queued` is registered: the buffer stays private, so `queued`,
/// `enqueue` and `dequeue` keep failing for ports.
pub fn register_port_queue<M: 'static>(protocol: &QueueProtocol<M>) {
    protocol.is_queued.define(&PORT, |value, ()| {
        value
            .downcast_ref::<Port>()
            .map(|port| port.pending() > 0)
            .ok_or_else(|| {
                DispatchError::failed(
                    "isQueued",
                    format!("'{}' value is not a port", value.type_name()),
                )
            })
    });
}
