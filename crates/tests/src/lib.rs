//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract checks (type hierarchy, configuration defaults)
//! - Dispatch and queue scenarios through the public APIs
//! - Port exchanges driven by the scheduler on a tokio runtime

#[cfg(test)]
mod contract_tests {
    use contracts::{Typed, NULL, NUMBER, OBJECT, STRING, UNDEFINED};
    use event_port::{Port, Scheduler, PORT};
    use serde_json::json;

    #[test]
    fn test_builtin_hierarchy() {
        assert!(NUMBER.is_a(&OBJECT));
        assert!(STRING.is_a(&OBJECT));
        assert!(PORT.is_a(&OBJECT));
        assert!(!NULL.is_a(&OBJECT));
        assert!(!UNDEFINED.is_a(&OBJECT));
    }

    #[test]
    fn test_value_tags() {
        assert_eq!(json!(null).type_tag(), &NULL);
        assert_eq!(json!(1.5).type_tag(), &NUMBER);
        assert_eq!(().type_tag(), &UNDEFINED);

        let scheduler = Scheduler::new();
        assert_eq!(Port::new(&scheduler).type_tag(), &PORT);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = config_loader::ConfigLoader::load_from_str(
            "",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(config.port.capacity, None);
        assert_eq!(config.scheduler.max_ticks, 10_000);
    }
}

#[cfg(test)]
mod dispatch_tests {
    use contracts::{Callable, Typed, NUMBER, OBJECT};
    use method::Method;
    use serde_json::{json, Value};

    fn samples() -> Vec<Box<dyn Typed>> {
        vec![
            Box::new(json!(null)),
            Box::new(()),
            Box::new(json!(7)),
            Box::new(json!("text")),
            Box::new(json!([1, 2])),
            Box::new(json!({ "a": 1 })),
            Box::new(Callable::new(|_| Value::Null)),
        ]
    }

    #[test]
    fn test_no_default_fails_for_everything() {
        let describe: Method<(), String> = Method::new("describe");
        for value in samples() {
            let err = describe.call(value.as_ref(), ()).unwrap_err();
            assert!(err.is_not_implemented(), "{}", value.type_name());
        }
    }

    #[test]
    fn test_default_number_and_object() {
        let describe: Method<(), &'static str> =
            Method::with_default("describe", |_, ()| Ok("default"));
        describe.define(&NUMBER, |_, ()| Ok("number"));

        let got: Vec<_> = samples()
            .iter()
            .map(|v| describe.call(v.as_ref(), ()).unwrap())
            .collect();
        assert_eq!(
            got,
            vec!["default", "default", "number", "default", "default", "default", "default"]
        );

        describe.define(&OBJECT, |_, ()| Ok("object"));
        let got: Vec<_> = samples()
            .iter()
            .map(|v| describe.call(v.as_ref(), ()).unwrap())
            .collect();
        assert_eq!(
            got,
            vec!["default", "default", "number", "object", "object", "object", "object"]
        );
    }
}

#[cfg(test)]
mod queue_tests {
    use contracts::{InstanceId, TypeTag, Typed, OBJECT};
    use queue::{QueueProtocol, SharedQueue};

    static MAILBOX: TypeTag = TypeTag::extends("Mailbox", &OBJECT);

    struct Mailbox {
        id: InstanceId,
        inbox: SharedQueue<u32>,
    }

    impl Typed for Mailbox {
        fn type_tag(&self) -> &'static TypeTag {
            &MAILBOX
        }

        fn instance_id(&self) -> Option<InstanceId> {
            Some(self.id)
        }
    }

    #[test]
    fn test_enqueue_dequeue_scenario() {
        let protocol = QueueProtocol::<u32>::new();
        protocol.define_for::<Mailbox>(&MAILBOX, |mailbox| mailbox.inbox.clone());

        let mailbox = Mailbox {
            id: InstanceId::next(),
            inbox: SharedQueue::new(),
        };

        protocol.enqueue.call(&mailbox, 1).unwrap();
        protocol.enqueue.call(&mailbox, 2).unwrap();
        assert_eq!(protocol.dequeue.call(&mailbox, ()).unwrap(), Some(1));
        assert_eq!(protocol.dequeue.call(&mailbox, ()).unwrap(), Some(2));
        assert!(!protocol.is_queued.call(&mailbox, ()).unwrap());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use contracts::{args, Arg, PortConfig, SchedulerConfig};
    use event_core::utils::{filter, DATA_EVENT};
    use event_core::{Emitter, Listener, ListenerError};
    use event_port::{connect, register_port_queue, Port, PortError, Scheduler};
    use observability::ExchangeAggregator;
    use queue::QueueProtocol;
    use serde_json::{json, Value};

    fn collect(emitter: &Emitter, name: &'static str) -> Rc<RefCell<Vec<Value>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        emitter.on(
            name,
            Listener::infallible(move |args| sink.borrow_mut().push(args[0].clone())),
        );
        seen
    }

    /// addon <-> content: content answers requests, addon collects replies
    #[tokio::test]
    async fn test_request_reply_over_connected_ports() {
        let scheduler = Scheduler::new();
        let addon = Port::new(&scheduler);
        let content = Port::new(&scheduler);

        let reply = content.clone();
        content.emitter().on(
            "request",
            Listener::new(move |args| {
                let n = args[0].as_i64().unwrap_or(0);
                reply
                    .emit("response", args![n * n])
                    .map_err(|e| ListenerError::new(e.to_string()))
            }),
        );
        let responses = collect(addon.emitter(), "response");

        connect(&addon, &content).unwrap();
        for n in 1..=3 {
            addon.emit("request", args![n]).unwrap();
        }
        assert!(responses.borrow().is_empty());

        let ticks = scheduler.drive().await.unwrap();
        assert_eq!(ticks, 2);
        assert_eq!(*responses.borrow(), vec![json!(1), json!(4), json!(9)]);

        addon.destroy();
        content.destroy();
    }

    #[tokio::test]
    async fn test_closed_port_retains_until_open() {
        let scheduler = Scheduler::new();
        let content = Port::new(&scheduler);
        let addon = Port::with_target(&scheduler, &content);
        let seen = collect(content.emitter(), "log");

        addon.emit("log", args!["one"]).unwrap();
        addon.emit("log", args!["two"]).unwrap();
        scheduler.drive().await.unwrap();
        assert!(seen.borrow().is_empty());

        addon.open().unwrap();
        assert_eq!(*seen.borrow(), vec![json!("one"), json!("two")]);

        addon.close().unwrap();
        addon.emit("log", args!["three"]).unwrap();
        scheduler.drive().await.unwrap();
        assert_eq!(seen.borrow().len(), 2);

        addon.open().unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_filtered_stream_across_port() {
        let scheduler = Scheduler::new();
        let content = Port::new(&scheduler);
        let addon = Port::with_target(&scheduler, &content);
        addon.open().unwrap();

        let evens = filter(
            |value| value.as_i64().is_some_and(|n| n % 2 == 0),
            content.emitter(),
        );
        let seen = collect(&evens, DATA_EVENT);

        for n in 1..=6 {
            addon.emit(DATA_EVENT, args![n]).unwrap();
        }
        scheduler.drive().await.unwrap();

        assert_eq!(*seen.borrow(), vec![json!(2), json!(4), json!(6)]);
    }

    #[test]
    fn test_queue_protocol_observes_port_buffer() {
        let protocol = QueueProtocol::<Value>::new();
        register_port_queue(&protocol);

        let scheduler = Scheduler::new();
        let port = Port::new(&scheduler);
        assert!(!protocol.is_queued.call(&port, ()).unwrap());

        port.emit("data", vec![Arg::from(json!({ "k": 1 }))]).unwrap();
        assert!(protocol.is_queued.call(&port, ()).unwrap());
    }

    #[test]
    fn test_configured_capacity_and_budget() {
        let config = config_loader::ConfigLoader::load_from_str(
            "[port]\ncapacity = 1\n[scheduler]\nmax_ticks = 3\n",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let scheduler = Scheduler::with_config(config.scheduler.clone());
        let port = Port::with_config(&scheduler, config.port.clone());
        port.emit("a", args![]).unwrap();
        assert_eq!(
            port.emit("b", args![]),
            Err(PortError::Overflow { capacity: 1 })
        );
        assert_eq!(port.pending(), 1);
    }

    #[tokio::test]
    async fn test_endless_ping_pong_hits_tick_budget() {
        let scheduler = Scheduler::with_config(SchedulerConfig { max_ticks: 10 });
        let left = Port::with_config(&scheduler, PortConfig::default());
        let right = Port::with_config(&scheduler, PortConfig::default());

        // Each side bounces every ball back
        for port in [&left, &right] {
            let bounce = port.clone();
            port.emitter().on(
                "ball",
                Listener::new(move |_| {
                    bounce
                        .emit("ball", args![])
                        .map_err(|e| ListenerError::new(e.to_string()))
                }),
            );
        }

        connect(&left, &right).unwrap();
        left.emit("ball", args![]).unwrap();

        assert!(scheduler.drive().await.is_err());
        left.destroy();
        right.destroy();
        // Remaining scheduled flushes are no-ops
        assert!(scheduler.run_until_idle().is_ok());
    }

    #[tokio::test]
    async fn test_aggregated_exchange_stats() {
        let scheduler = Scheduler::new();
        let addon = Port::new(&scheduler);
        let content = Port::new(&scheduler);
        connect(&addon, &content).unwrap();

        let mut aggregator = ExchangeAggregator::new();
        for round in 0..4 {
            addon.emit("tick", args![round]).unwrap();
            let ticks = scheduler.drive().await.unwrap();
            aggregator.update_round(ticks, 1);
        }
        aggregator.update_port("addon", addon.metrics());
        aggregator.update_port("content", content.metrics());

        let summary = aggregator.summary();
        assert_eq!(summary.rounds, 4);
        assert_eq!(summary.total_emitted, 4);
        assert_eq!(summary.total_delivered, 4);
        assert!((summary.delivery_rate - 100.0).abs() < 1e-10);
    }
}
