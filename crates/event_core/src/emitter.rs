//! Emitter - listener registry with synchronous emission

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{EventError, ListenerError};
use crate::listener::Listener;
use crate::ERROR_EVENT;

#[derive(Clone)]
struct Registration {
    listener: Listener,
    once: bool,
}

/// Publish/subscribe emitter.
///
/// Cheap to clone: clones share one listener table.
#[derive(Clone, Default)]
pub struct Emitter {
    listeners: Rc<RefCell<HashMap<String, Vec<Registration>>>>,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        let mut map = f.debug_map();
        for (name, registrations) in listeners.iter() {
            map.entry(name, &registrations.len());
        }
        map.finish()
    }
}

impl Emitter {
    /// Create an emitter without listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `name`.
    ///
    /// Registering the same listener twice invokes it twice.
    pub fn on(&self, name: &str, listener: Listener) -> &Self {
        self.register(name, listener, false)
    }

    /// Register `listener` for the next `name` event only
    pub fn once(&self, name: &str, listener: Listener) -> &Self {
        self.register(name, listener, true)
    }

    fn register(&self, name: &str, listener: Listener, once: bool) -> &Self {
        self.listeners
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push(Registration { listener, once });
        self
    }

    /// Remove the most recent registration of `listener` for `name`.
    ///
    /// Unknown listeners are ignored.
    pub fn off(&self, name: &str, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        let Some(registrations) = listeners.get_mut(name) else {
            return;
        };

        if let Some(pos) = registrations
            .iter()
            .rposition(|r| r.listener.ptr_eq(listener))
        {
            registrations.remove(pos);
        }
        if registrations.is_empty() {
            listeners.remove(name);
        }
    }

    /// Remove every listener for `name`, or every listener when `None`
    pub fn off_all(&self, name: Option<&str>) {
        let mut listeners = self.listeners.borrow_mut();
        match name {
            Some(name) => {
                listeners.remove(name);
            }
            None => listeners.clear(),
        }
    }

    /// Number of registrations for `name`
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.borrow().get(name).map_or(0, Vec::len)
    }

    /// Whether `name` has at least one listener
    pub fn has_listeners(&self, name: &str) -> bool {
        self.listener_count(name) > 0
    }

    /// Invoke every listener registered for `name`, in registration order.
    ///
    /// Listeners added or removed while emitting do not affect this pass.
    /// A failing listener does not stop delivery: the failure is emitted as
    /// an `error` event (`[message, name]`) when that event has listeners.
    ///
    /// # Errors
    /// The first unhandled listener failure, after every listener ran.
    pub fn emit(&self, name: &str, args: &[Value]) -> Result<(), EventError> {
        let snapshot = self.take_snapshot(name);
        if snapshot.is_empty() {
            trace!(event = name, "No listeners");
            return Ok(());
        }
        trace!(event = name, listeners = snapshot.len(), "Emitting");

        let mut first_failure: Option<EventError> = None;

        for registration in &snapshot {
            let Err(err) = registration.listener.call(args) else {
                continue;
            };

            if let Err(unhandled) = self.report(name, err) {
                if first_failure.is_none() {
                    first_failure = Some(unhandled);
                } else {
                    warn!(event = name, error = %unhandled, "Additional listener failure");
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Copy the registrations for `name`, dropping `once` entries from the table
    fn take_snapshot(&self, name: &str) -> Vec<Registration> {
        let mut listeners = self.listeners.borrow_mut();
        let Some(registrations) = listeners.get_mut(name) else {
            return Vec::new();
        };

        let snapshot = registrations.clone();
        registrations.retain(|r| !r.once);
        if registrations.is_empty() {
            listeners.remove(name);
        }
        snapshot
    }

    /// Route a listener failure to `error` listeners, or hand it back
    fn report(&self, name: &str, err: ListenerError) -> Result<(), EventError> {
        if name == ERROR_EVENT || !self.has_listeners(ERROR_EVENT) {
            return Err(EventError::listener(name, err));
        }

        let args = [
            Value::String(err.message().to_string()),
            Value::String(name.to_string()),
        ];
        self.emit(ERROR_EVENT, &args)
    }
}
