//! Listener handles

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::ListenerError;

/// Listener outcome
pub type ListenerResult = Result<(), ListenerError>;

/// Registered callback.
///
/// Identity is the handle: clones of one `Listener` are the same listener
/// for `off`, two `Listener::new` calls on equal closures are not.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&[Value]) -> ListenerResult>);

impl Listener {
    /// Wrap a fallible callback
    pub fn new(f: impl Fn(&[Value]) -> ListenerResult + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Wrap a callback that cannot fail
    pub fn infallible(f: impl Fn(&[Value]) + 'static) -> Self {
        Self::new(move |args| {
            f(args);
            Ok(())
        })
    }

    /// Invoke the callback
    pub fn call(&self, args: &[Value]) -> ListenerResult {
        (self.0)(args)
    }

    /// Whether both handles are the same listener
    pub fn ptr_eq(&self, other: &Listener) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0))
    }
}
