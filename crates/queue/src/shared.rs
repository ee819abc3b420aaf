//! SharedQueue - backing sequence handed out by `queued`

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Shared FIFO sequence.
///
/// Cloning yields another handle to the same sequence, which is how a
/// `queued` implementation exposes a value's storage to the protocol.
pub struct SharedQueue<M>(Rc<RefCell<VecDeque<M>>>);

impl<M> SharedQueue<M> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(VecDeque::new())))
    }

    /// Append to the tail
    pub fn push(&self, message: M) {
        self.0.borrow_mut().push_back(message);
    }

    /// Remove from the head
    pub fn pop(&self) -> Option<M> {
        self.0.borrow_mut().pop_front()
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Copy of the queued messages, head first
    pub fn snapshot(&self) -> Vec<M>
    where
        M: Clone,
    {
        self.0.borrow().iter().cloned().collect()
    }
}

impl<M> Clone for SharedQueue<M> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<M> Default for SharedQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: fmt::Debug> fmt::Debug for SharedQueue<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.borrow().iter()).finish()
    }
}

impl<M> FromIterator<M> for SharedQueue<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self(Rc::new(RefCell::new(iter.into_iter().collect())))
    }
}
