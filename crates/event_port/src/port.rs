//! Port - buffered, switchable event link between two emitters
//!
//! ```text
//! emit ──► events ──(open + target, next tick or flush)──► target.emitter
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use contracts::{Arg, EventRecord, InstanceId, PortConfig, PortStats, TypeTag, Typed, OBJECT};
use event_core::Emitter;
use tracing::{debug, instrument, trace, warn};

use crate::error::PortError;
use crate::metrics::PortMetrics;
use crate::scheduler::Scheduler;

/// Type tag of [`Port`]
pub static PORT: TypeTag = TypeTag::extends("Port", &OBJECT);

#[derive(Default)]
struct PortState {
    events: VecDeque<EventRecord>,
    target: Option<Weak<PortInner>>,
    open: bool,
    destroyed: bool,
    flush_scheduled: bool,
}

struct PortInner {
    id: InstanceId,
    label: String,
    emitter: Emitter,
    scheduler: Scheduler,
    config: PortConfig,
    metrics: PortMetrics,
    state: RefCell<PortState>,
}

/// Event port.
///
/// Starts closed with no target. Cheap to clone: clones are the same port.
/// The target link is weak, so a port never keeps its target alive.
#[derive(Clone)]
pub struct Port {
    inner: Rc<PortInner>,
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Port")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("open", &state.open)
            .field("destroyed", &state.destroyed)
            .field("pending", &state.events.len())
            .field("has_target", &state.target.is_some())
            .finish()
    }
}

impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Port {}

impl Typed for Port {
    fn type_tag(&self) -> &'static TypeTag {
        &PORT
    }

    fn instance_id(&self) -> Option<InstanceId> {
        Some(self.inner.id)
    }
}

impl Port {
    /// Closed, unbounded port without target
    pub fn new(scheduler: &Scheduler) -> Self {
        Self::with_config(scheduler, PortConfig::default())
    }

    /// Closed port piped to `target`
    pub fn with_target(scheduler: &Scheduler, target: &Port) -> Self {
        let port = Self::new(scheduler);
        port.inner.state.borrow_mut().target = Some(Rc::downgrade(&target.inner));
        port
    }

    pub fn with_config(scheduler: &Scheduler, config: PortConfig) -> Self {
        let id = InstanceId::next();
        let label = config.metrics_label().to_string();
        debug!(port = %id, label = %label, capacity = ?config.capacity, "Port created");
        Self {
            inner: Rc::new(PortInner {
                id,
                label,
                emitter: Emitter::new(),
                scheduler: scheduler.clone(),
                config,
                metrics: PortMetrics::new(),
                state: RefCell::new(PortState::default()),
            }),
        }
    }

    fn ensure_live(&self) -> Result<(), PortError> {
        if self.inner.state.borrow().destroyed {
            return Err(PortError::Destroyed);
        }
        Ok(())
    }

    /// Replace the target link. `None` detaches.
    ///
    /// Neither opens nor flushes: buffered events go to the new target on
    /// the next flush.
    pub fn pipe(&self, target: Option<&Port>) -> Result<(), PortError> {
        self.ensure_live()?;
        self.inner.state.borrow_mut().target = target.map(|t| Rc::downgrade(&t.inner));
        debug!(
            port = %self.inner.id,
            target = ?target.map(Port::id),
            "Port piped"
        );
        Ok(())
    }

    /// Open the port and deliver what is buffered.
    ///
    /// Returns the number of events delivered.
    #[instrument(name = "port_open", skip(self), fields(port = %self.inner.id))]
    pub fn open(&self) -> Result<usize, PortError> {
        self.ensure_live()?;
        self.inner.state.borrow_mut().open = true;
        debug!("Port opened");
        self.flush()
    }

    /// Deliver what is buffered, then close the port.
    ///
    /// The port ends up closed even when delivery fails.
    #[instrument(name = "port_close", skip(self), fields(port = %self.inner.id))]
    pub fn close(&self) -> Result<usize, PortError> {
        self.ensure_live()?;
        let result = self.flush();
        self.inner.state.borrow_mut().open = false;
        debug!("Port closed");
        result
    }

    /// Buffer an event.
    ///
    /// Callables are dropped from the arguments. When the port is open a
    /// flush is scheduled for the next tick; emits in the same turn share
    /// it. Nothing is delivered synchronously.
    ///
    /// # Errors
    /// `Overflow` when the buffer is at capacity, leaving it unchanged.
    pub fn emit(&self, name: &str, args: Vec<Arg>) -> Result<(), PortError> {
        self.ensure_live()?;

        let dropped: usize = args.iter().map(Arg::callable_count).sum();
        let record = EventRecord::from_args(name, &args);

        let (depth, schedule) = {
            let mut state = self.inner.state.borrow_mut();
            if let Some(capacity) = self.inner.config.capacity {
                if state.events.len() >= capacity {
                    drop(state);
                    self.inner.metrics.inc_overflowed();
                    observability::record_overflow(&self.inner.label);
                    warn!(port = %self.inner.id, event = name, capacity, "Port buffer full");
                    return Err(PortError::Overflow { capacity });
                }
            }

            state.events.push_back(record);
            let schedule = state.open && !state.flush_scheduled;
            if schedule {
                state.flush_scheduled = true;
            }
            (state.events.len(), schedule)
        };

        self.inner.metrics.inc_emitted();
        if dropped > 0 {
            self.inner.metrics.add_dropped_callables(dropped);
            trace!(port = %self.inner.id, event = name, dropped, "Callables dropped");
        }
        observability::record_event_emitted(&self.inner.label);
        observability::record_buffer_depth(&self.inner.label, depth);
        trace!(port = %self.inner.id, event = name, depth, "Event buffered");

        if schedule {
            self.schedule_flush();
        }
        Ok(())
    }

    fn schedule_flush(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.scheduler.defer(move || {
            if let Some(inner) = weak.upgrade() {
                Port { inner }.run_scheduled_flush();
            }
        });
    }

    fn run_scheduled_flush(&self) {
        let runnable = {
            let mut state = self.inner.state.borrow_mut();
            state.flush_scheduled = false;
            state.open && !state.destroyed
        };
        if !runnable {
            trace!(port = %self.inner.id, "Scheduled flush skipped");
            return;
        }

        if let Err(e) = self.flush() {
            warn!(port = %self.inner.id, error = %e, "Scheduled flush failed");
            // Records behind the failed one go out on the next tick
            let reschedule = {
                let mut state = self.inner.state.borrow_mut();
                let reschedule = state.open
                    && !state.destroyed
                    && !state.flush_scheduled
                    && !state.events.is_empty();
                if reschedule {
                    state.flush_scheduled = true;
                }
                reschedule
            };
            if reschedule {
                self.schedule_flush();
            }
        }
    }

    /// Deliver buffered events to the target now, oldest first.
    ///
    /// Does nothing while closed or without a live target. Events emitted
    /// during the drain are delivered by it too. Returns the number of
    /// events delivered.
    ///
    /// # Errors
    /// `Delivery` when a target listener fails unhandled. The failing event
    /// is consumed, later ones stay buffered.
    #[instrument(name = "port_flush", skip(self), fields(port = %self.inner.id))]
    pub fn flush(&self) -> Result<usize, PortError> {
        self.ensure_live()?;

        let mut delivered = 0;
        let result = loop {
            // Target may be rewired or destroyed by a listener mid-drain
            let Some(target) = self.live_target() else {
                break Ok(());
            };
            let record = {
                let mut state = self.inner.state.borrow_mut();
                if !state.open {
                    break Ok(());
                }
                match state.events.pop_front() {
                    Some(record) => record,
                    None => break Ok(()),
                }
            };

            trace!(event = %record.name, target = %target.inner.id, "Delivering");
            self.inner.metrics.inc_delivered();
            delivered += 1;
            if let Err(e) = target.inner.emitter.emit(&record.name, &record.args) {
                break Err(PortError::Delivery(e));
            }
        };

        observability::record_events_delivered(&self.inner.label, delivered);
        observability::record_buffer_depth(&self.inner.label, self.pending());
        if delivered > 0 {
            debug!(delivered, remaining = self.pending(), "Flushed");
        }
        result.map(|()| delivered)
    }

    fn live_target(&self) -> Option<Port> {
        let weak = self.inner.state.borrow().target.clone()?;
        let inner = weak.upgrade()?;
        if inner.state.borrow().destroyed {
            return None;
        }
        Some(Port { inner })
    }

    /// Tear the port down: drop the target link, buffered events and
    /// listeners. Later operations fail with `Destroyed`. Idempotent.
    pub fn destroy(&self) {
        let discarded = {
            let mut state = self.inner.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.open = false;
            state.target = None;
            let discarded = state.events.len();
            state.events.clear();
            discarded
        };
        self.inner.emitter.off_all(None);
        observability::record_buffer_depth(&self.inner.label, 0);
        debug!(port = %self.inner.id, discarded, "Port destroyed");
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.borrow().open
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.state.borrow().destroyed
    }

    /// Number of buffered events
    pub fn pending(&self) -> usize {
        self.inner.state.borrow().events.len()
    }

    /// Buffered events, oldest first
    pub fn pending_events(&self) -> Vec<EventRecord> {
        self.inner.state.borrow().events.iter().cloned().collect()
    }

    /// Current target, if set and still alive
    pub fn target(&self) -> Option<Port> {
        let weak = self.inner.state.borrow().target.clone()?;
        weak.upgrade().map(|inner| Port { inner })
    }

    /// Listener registry that receives events delivered to this port
    pub fn emitter(&self) -> &Emitter {
        &self.inner.emitter
    }

    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    /// Label the port's metrics are recorded under
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn config(&self) -> &PortConfig {
        &self.inner.config
    }

    pub fn metrics(&self) -> PortStats {
        self.inner.metrics.snapshot(self.pending())
    }
}

/// Pipe `a` and `b` to each other, then open both
pub fn connect(a: &Port, b: &Port) -> Result<(), PortError> {
    a.pipe(Some(b))?;
    b.pipe(Some(a))?;
    a.open()?;
    b.open()?;
    debug!(a = %a.id(), b = %b.id(), "Ports connected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{args, Callable, SchedulerConfig};
    use event_core::{EventError, Listener, ListenerError};
    use serde_json::{json, Value};

    type Log = Rc<RefCell<Vec<(String, Vec<Value>)>>>;

    /// Record every `name` event reaching `port`
    fn record(port: &Port, name: &'static str) -> Log {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        port.emitter().on(
            name,
            Listener::infallible(move |args| {
                sink.borrow_mut().push((name.to_string(), args.to_vec()))
            }),
        );
        log
    }

    fn firsts(log: &Log) -> Vec<Value> {
        log.borrow().iter().map(|(_, args)| args[0].clone()).collect()
    }

    #[test]
    fn test_new_port_is_closed() {
        let scheduler = Scheduler::new();
        let port = Port::new(&scheduler);
        assert!(!port.is_open());
        assert!(!port.is_destroyed());
        assert_eq!(port.pending(), 0);
        assert!(port.target().is_none());
        assert_eq!(port.type_tag(), &PORT);
        assert!(PORT.is_a(&OBJECT));
    }

    #[test]
    fn test_closed_port_buffers_until_open() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);

        port.emit("data", args![1]).unwrap();
        port.emit("data", args![2]).unwrap();
        scheduler.run_until_idle().unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(port.pending(), 2);

        assert_eq!(port.open().unwrap(), 2);
        assert_eq!(firsts(&log), vec![json!(1), json!(2)]);
        assert_eq!(port.pending(), 0);
    }

    #[test]
    fn test_open_port_delivers_next_tick() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);
        port.open().unwrap();

        port.emit("data", args!["e1"]).unwrap();
        port.emit("data", args!["e2"]).unwrap();
        assert!(log.borrow().is_empty());
        // Both emits share one flush task
        assert_eq!(scheduler.pending_tasks(), 1);

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(firsts(&log), vec![json!("e1"), json!("e2")]);
    }

    #[test]
    fn test_explicit_flush_is_synchronous() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);
        port.open().unwrap();

        port.emit("data", args![1]).unwrap();
        assert_eq!(port.flush().unwrap(), 1);
        assert_eq!(firsts(&log), vec![json!(1)]);

        // The pending scheduled flush finds nothing left
        scheduler.run_until_idle().unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_flush_while_closed_delivers_nothing() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);

        port.emit("data", args![1]).unwrap();
        assert_eq!(port.flush().unwrap(), 0);
        assert!(log.borrow().is_empty());
        assert_eq!(port.pending(), 1);
    }

    #[test]
    fn test_close_flushes_then_retains() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);
        port.open().unwrap();

        port.emit("data", args![1]).unwrap();
        assert_eq!(port.close().unwrap(), 1);
        assert!(!port.is_open());

        port.emit("data", args![2]).unwrap();
        port.emit("data", args![3]).unwrap();
        scheduler.run_until_idle().unwrap();
        assert_eq!(firsts(&log), vec![json!(1)]);

        port.open().unwrap();
        assert_eq!(firsts(&log), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_scheduled_flush_skipped_after_close() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);
        port.open().unwrap();

        port.emit("data", args![1]).unwrap();
        port.inner.state.borrow_mut().open = false;
        scheduler.run_until_idle().unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(port.pending(), 1);
    }

    #[test]
    fn test_open_without_target_keeps_events() {
        let scheduler = Scheduler::new();
        let port = Port::new(&scheduler);
        port.open().unwrap();

        port.emit("data", args![1]).unwrap();
        port.emit("data", args![2]).unwrap();
        scheduler.run_until_idle().unwrap();
        assert_eq!(port.pending(), 2);

        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        port.pipe(Some(&target)).unwrap();
        // Piping alone does not flush
        assert!(log.borrow().is_empty());

        assert_eq!(port.flush().unwrap(), 2);
        assert_eq!(firsts(&log), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_repipe_redirects_future_flushes() {
        let scheduler = Scheduler::new();
        let first = Port::new(&scheduler);
        let second = Port::new(&scheduler);
        let first_log = record(&first, "data");
        let second_log = record(&second, "data");

        let port = Port::with_target(&scheduler, &first);
        port.open().unwrap();
        port.emit("data", args!["a"]).unwrap();
        scheduler.run_until_idle().unwrap();

        port.pipe(Some(&second)).unwrap();
        port.emit("data", args!["b"]).unwrap();
        scheduler.run_until_idle().unwrap();

        assert_eq!(firsts(&first_log), vec![json!("a")]);
        assert_eq!(firsts(&second_log), vec![json!("b")]);
        assert_eq!(port.target(), Some(second.clone()));

        port.pipe(None).unwrap();
        assert!(port.target().is_none());
    }

    #[test]
    fn test_connect_exchanges_once_in_order() {
        let scheduler = Scheduler::new();
        let addon = Port::new(&scheduler);
        let content = Port::new(&scheduler);
        let at_addon = record(&addon, "data");
        let at_content = record(&content, "data");

        connect(&addon, &content).unwrap();
        addon.emit("data", args!["a1"]).unwrap();
        content.emit("data", args!["c1"]).unwrap();
        addon.emit("data", args!["a2"]).unwrap();
        scheduler.run_until_idle().unwrap();

        assert_eq!(firsts(&at_content), vec![json!("a1"), json!("a2")]);
        assert_eq!(firsts(&at_addon), vec![json!("c1")]);
    }

    #[test]
    fn test_ping_pong_across_ticks() {
        let scheduler = Scheduler::new();
        let addon = Port::new(&scheduler);
        let content = Port::new(&scheduler);
        connect(&addon, &content).unwrap();

        // content answers every ping with a pong
        let reply = content.clone();
        content.emitter().on(
            "ping",
            Listener::new(move |args| {
                reply
                    .emit("pong", vec![Arg::from(args[0].clone())])
                    .map_err(|e| ListenerError::new(e.to_string()))
            }),
        );
        let pongs = record(&addon, "pong");

        addon.emit("ping", args![1]).unwrap();
        addon.emit("ping", args![2]).unwrap();

        assert_eq!(scheduler.run_until_idle().unwrap(), 2);
        assert_eq!(firsts(&pongs), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_self_pipe() {
        let scheduler = Scheduler::new();
        let port = Port::new(&scheduler);
        let log = record(&port, "data");
        port.pipe(Some(&port)).unwrap();
        port.open().unwrap();

        port.emit("data", args![1]).unwrap();
        scheduler.run_until_idle().unwrap();
        assert_eq!(firsts(&log), vec![json!(1)]);
    }

    #[test]
    fn test_reentrant_emit_delivered_in_same_drain() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let port = Port::with_target(&scheduler, &target);
        port.open().unwrap();

        let source = port.clone();
        target.emitter().once(
            "data",
            Listener::new(move |_| {
                source
                    .emit("data", args!["echo"])
                    .map_err(|e| ListenerError::new(e.to_string()))
            }),
        );
        let log = record(&target, "data");

        port.emit("data", args!["first"]).unwrap();
        port.flush().unwrap();
        assert_eq!(firsts(&log), vec![json!("first"), json!("echo")]);
        assert_eq!(port.pending(), 0);
    }

    #[test]
    fn test_callables_are_dropped() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);
        port.open().unwrap();

        let callback = Callable::new(|_| Value::Null);
        let record_arg = Arg::Record(
            [
                ("id".to_string(), Arg::from(7)),
                ("reply".to_string(), Arg::from(callback.clone())),
            ]
            .into_iter()
            .collect(),
        );
        let list_arg = Arg::List(vec![Arg::from(1), Arg::from(callback.clone())]);
        port.emit("data", vec![Arg::from(callback), record_arg, list_arg])
            .unwrap();
        port.flush().unwrap();

        assert_eq!(
            log.borrow()[0].1,
            vec![Value::Null, json!({ "id": 7 }), json!([1, null])]
        );
        assert_eq!(port.metrics().dropped_callables, 3);
    }

    #[test]
    fn test_overflow_leaves_buffer_intact() {
        let scheduler = Scheduler::new();
        let port = Port::with_config(&scheduler, PortConfig::bounded(2));

        port.emit("data", args![1]).unwrap();
        port.emit("data", args![2]).unwrap();
        let err = port.emit("data", args![3]).unwrap_err();

        assert_eq!(err, PortError::Overflow { capacity: 2 });
        assert!(err.is_overflow());
        assert_eq!(
            port.pending_events(),
            vec![
                EventRecord::new("data", vec![json!(1)]),
                EventRecord::new("data", vec![json!(2)]),
            ]
        );

        let stats = port.metrics();
        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.overflowed, 1);
    }

    #[test]
    fn test_destroyed_port_rejects_operations() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let port = Port::with_target(&scheduler, &target);
        port.emitter().on("data", Listener::infallible(|_| {}));
        port.emit("data", args![1]).unwrap();

        port.destroy();
        port.destroy();

        assert!(port.is_destroyed());
        assert!(!port.is_open());
        assert_eq!(port.pending(), 0);
        assert!(port.target().is_none());
        assert!(!port.emitter().has_listeners("data"));

        assert_eq!(port.emit("data", args![2]), Err(PortError::Destroyed));
        assert_eq!(port.open(), Err(PortError::Destroyed));
        assert_eq!(port.close(), Err(PortError::Destroyed));
        assert_eq!(port.flush(), Err(PortError::Destroyed));
        assert_eq!(port.pipe(Some(&target)), Err(PortError::Destroyed));
        assert_eq!(connect(&port, &target), Err(PortError::Destroyed));
    }

    #[test]
    fn test_destroyed_target_is_absent() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let port = Port::with_target(&scheduler, &target);
        port.open().unwrap();
        target.destroy();

        port.emit("data", args![1]).unwrap();
        assert_eq!(port.flush().unwrap(), 0);
        assert_eq!(port.pending(), 1);
    }

    #[test]
    fn test_dropped_target_is_absent() {
        let scheduler = Scheduler::new();
        let port = Port::new(&scheduler);
        {
            let target = Port::new(&scheduler);
            port.pipe(Some(&target)).unwrap();
        }
        port.open().unwrap();
        port.emit("data", args![1]).unwrap();
        scheduler.run_until_idle().unwrap();

        assert!(port.target().is_none());
        assert_eq!(port.pending(), 1);
    }

    #[test]
    fn test_dropped_port_skips_scheduled_flush() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let log = record(&target, "data");
        {
            let port = Port::with_target(&scheduler, &target);
            port.open().unwrap();
            port.emit("data", args![1]).unwrap();
        }
        assert_eq!(scheduler.run_until_idle().unwrap(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_delivery_failure_stops_drain() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        target
            .emitter()
            .on("bad", Listener::new(|_| Err(ListenerError::new("boom"))));
        let log = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);

        port.emit("data", args![1]).unwrap();
        port.emit("bad", args![]).unwrap();
        port.emit("data", args![2]).unwrap();

        let err = port.open().unwrap_err();
        assert_eq!(
            err,
            PortError::Delivery(EventError::listener("bad", ListenerError::new("boom")))
        );
        assert_eq!(firsts(&log), vec![json!(1)]);
        assert_eq!(port.pending(), 1);

        assert_eq!(port.flush().unwrap(), 1);
        assert_eq!(firsts(&log), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_scheduled_flush_failure_keeps_delivering() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        target
            .emitter()
            .on("bad", Listener::new(|_| Err(ListenerError::new("boom"))));
        let data = record(&target, "data");
        let port = Port::with_target(&scheduler, &target);
        port.open().unwrap();

        port.emit("bad", args![]).unwrap();
        port.emit("bad", args![]).unwrap();
        port.emit("data", args![2]).unwrap();

        // Each failure ends a drain and the rest moves to the next tick
        assert_eq!(scheduler.run_until_idle().unwrap(), 3);
        assert_eq!(firsts(&data), vec![json!(2)]);
        assert_eq!(port.pending(), 0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_failed_scheduled_flush_stops_once_target_detached() {
        let scheduler = Scheduler::new();
        let target = Port::new(&scheduler);
        let port = Port::with_target(&scheduler, &target);
        let detach = port.clone();
        target.emitter().on(
            "bad",
            Listener::new(move |_| {
                detach.pipe(None).ok();
                Err(ListenerError::new("boom"))
            }),
        );
        port.open().unwrap();

        port.emit("bad", args![]).unwrap();
        port.emit("data", args![1]).unwrap();
        // Retried once, then waits for a target
        assert_eq!(scheduler.run_until_idle().unwrap(), 2);
        assert_eq!(port.pending(), 1);
        assert!(port.is_open());
        port.destroy();
    }

    #[test]
    fn test_metrics_counts() {
        let scheduler = Scheduler::with_config(SchedulerConfig::default());
        let target = Port::new(&scheduler);
        let port = Port::with_target(&scheduler, &target);
        port.emit("data", args![1]).unwrap();
        port.emit("data", args![2]).unwrap();
        port.open().unwrap();
        port.close().unwrap();
        port.emit("data", args![3]).unwrap();

        let stats = port.metrics();
        assert_eq!(stats.emitted, 3);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn test_metrics_label_comes_from_config() {
        let scheduler = Scheduler::new();
        let unlabelled = Port::new(&scheduler);
        let other = Port::new(&scheduler);
        assert_eq!(unlabelled.label(), contracts::DEFAULT_PORT_LABEL);
        // Label is shared, identity is not
        assert_eq!(unlabelled.label(), other.label());
        assert_ne!(unlabelled.id(), other.id());

        let addon = Port::with_config(&scheduler, PortConfig::bounded(2).with_label("addon"));
        assert_eq!(addon.label(), "addon");
        assert_eq!(addon.config().capacity, Some(2));
    }

    #[test]
    fn test_distinct_identities() {
        let scheduler = Scheduler::new();
        let a = Port::new(&scheduler);
        let b = Port::new(&scheduler);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.instance_id(), Some(a.id()));
        assert_eq!(a.clone(), a);
        assert_ne!(a, b);
    }
}
