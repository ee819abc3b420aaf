//! # Event Core
//!
//! Minimal publish/subscribe primitive.
//!
//! Responsibilities:
//! - Register/unregister listeners by event name
//! - Synchronous emission in registration order, over a snapshot of the
//!   listeners registered when `emit` starts
//! - Listener failures reported as `error` events, or returned to the caller
//!
//! ## Example
//!
//! ```
//! use event_core::{Emitter, Listener};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//!
//! let emitter = Emitter::new();
//! emitter.on("data", Listener::infallible(move |args| sink.borrow_mut().extend_from_slice(args)));
//! emitter.emit("data", &[json!(1)]).unwrap();
//!
//! assert_eq!(*seen.borrow(), vec![json!(1)]);
//! ```

mod emitter;
mod error;
mod listener;
pub mod utils;

pub use emitter::Emitter;
pub use error::{EventError, ListenerError};
pub use listener::{Listener, ListenerResult};

/// Event name used to report listener failures
pub const ERROR_EVENT: &str = "error";
