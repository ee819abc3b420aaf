//! QueueProtocol - `queued` / `isQueued` / `enqueue` / `dequeue`

use contracts::{TypeTag, Typed};
use method::{DispatchError, Method};
use tracing::trace;

use crate::shared::SharedQueue;

/// The four queue methods, sharing one `queued` table.
///
/// No type is queue-capable out of the box: `queued` has no default, so
/// every other operation fails with `NotImplemented` naming `queued`
/// until a backing sequence is registered.
pub struct QueueProtocol<M> {
    /// Backing sequence of a value
    pub queued: Method<(), SharedQueue<M>>,
    /// Whether the value has queued messages
    pub is_queued: Method<(), bool>,
    /// Append a message to the tail
    pub enqueue: Method<M, ()>,
    /// Remove and return the head
    pub dequeue: Method<(), Option<M>>,
}

impl<M: 'static> QueueProtocol<M> {
    /// Create the protocol with its default implementations
    pub fn new() -> Self {
        let queued: Method<(), SharedQueue<M>> = Method::new("queued");

        let is_queued = {
            let queued = queued.clone();
            Method::with_default("isQueued", move |value, ()| {
                Ok(!queued.call(value, ())?.is_empty())
            })
        };

        let enqueue = {
            let queued = queued.clone();
            Method::with_default("enqueue", move |value, message| {
                queued.call(value, ())?.push(message);
                trace!(type_name = value.type_name(), "Message enqueued");
                Ok(())
            })
        };

        let dequeue = {
            let queued = queued.clone();
            Method::with_default("dequeue", move |value, ()| {
                let message = queued.call(value, ())?.pop();
                trace!(
                    type_name = value.type_name(),
                    found = message.is_some(),
                    "Message dequeued"
                );
                Ok(message)
            })
        };

        Self {
            queued,
            is_queued,
            enqueue,
            dequeue,
        }
    }

    /// Register `queued` for every value tagged `tag` whose concrete type
    /// is `T`, using `accessor` to reach its backing sequence.
    pub fn define_for<T: Typed>(
        &self,
        tag: &'static TypeTag,
        accessor: impl Fn(&T) -> SharedQueue<M> + 'static,
    ) -> &Self {
        self.queued.define(tag, move |value, ()| {
            value.downcast_ref::<T>().map(&accessor).ok_or_else(|| {
                DispatchError::failed(
                    "queued",
                    format!("'{}' value is not the registered type", value.type_name()),
                )
            })
        });
        self
    }
}

impl<M: 'static> Default for QueueProtocol<M> {
    fn default() -> Self {
        Self::new()
    }
}
