//! Higher-order helpers over event streams.
//!
//! A stream is an emitter dispatching `data`, `end` and `error` events.

use serde_json::Value;

use crate::emitter::Emitter;
use crate::error::ListenerError;
use crate::listener::Listener;
use crate::ERROR_EVENT;

/// Data event name
pub const DATA_EVENT: &str = "data";
/// End-of-stream event name
pub const END_EVENT: &str = "end";

/// Stream of the `data` events of `input` whose first argument satisfies
/// `predicate`. `error` and `end` always pass through.
pub fn filter(predicate: impl Fn(&Value) -> bool + 'static, input: &Emitter) -> Emitter {
    let output = Emitter::new();

    for name in [ERROR_EVENT, END_EVENT] {
        let out = output.clone();
        input.on(
            name,
            Listener::new(move |args| out.emit(name, args).map_err(ListenerError::from)),
        );
    }

    let out = output.clone();
    input.on(
        DATA_EVENT,
        Listener::new(move |args| {
            let head = args.first().unwrap_or(&Value::Null);
            if predicate(head) {
                out.emit(DATA_EVENT, args).map_err(ListenerError::from)
            } else {
                Ok(())
            }
        }),
    );

    output
}
