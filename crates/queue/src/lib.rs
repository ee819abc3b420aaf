//! # Queue
//!
//! Queue protocol built on [`method::Method`].
//!
//! Any value becomes a FIFO queue once `queued` is implemented for its
//! type (or for the instance). The other operations default to working
//! through `queued` and can each be overridden independently.
//!
//! ```
//! use contracts::{InstanceId, TypeTag, Typed, OBJECT};
//! use queue::{QueueProtocol, SharedQueue};
//!
//! static INBOX: TypeTag = TypeTag::extends("Inbox", &OBJECT);
//!
//! struct Inbox {
//!     queued: SharedQueue<u32>,
//! }
//!
//! impl Typed for Inbox {
//!     fn type_tag(&self) -> &'static TypeTag {
//!         &INBOX
//!     }
//! }
//!
//! let protocol = QueueProtocol::<u32>::new();
//! protocol.define_for::<Inbox>(&INBOX, |inbox| inbox.queued.clone());
//!
//! let inbox = Inbox { queued: SharedQueue::new() };
//! protocol.enqueue.call(&inbox, 1).unwrap();
//! assert_eq!(protocol.dequeue.call(&inbox, ()).unwrap(), Some(1));
//! ```

mod protocol;
mod shared;

pub use protocol::QueueProtocol;
pub use shared::SharedQueue;
