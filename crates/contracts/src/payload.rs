//! Event payloads
//!
//! Producers emit [`Arg`]s, which may mix plain data with in-process
//! callables. Ports serialize them into an [`EventRecord`] that only holds
//! plain data (`serde_json::Value`), dropping every callable on the way.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use serde_json::Value;

/// In-process callable that can travel inside an argument list.
///
/// Callables only matter on the emitting side of a port: serialization
/// drops them.
#[derive(Clone)]
pub struct Callable(Rc<dyn Fn(&[Value]) -> Value>);

impl Callable {
    /// Wrap a closure
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callable
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Whether both handles point at the same closure
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// A single emitted argument, before serialization
#[derive(Debug, Clone)]
pub enum Arg {
    /// Plain data, kept as-is
    Data(Value),
    /// Callable, dropped on serialization
    Callable(Callable),
    /// Ordered list that may contain callables
    List(Vec<Arg>),
    /// String-keyed record that may contain callables
    Record(BTreeMap<String, Arg>),
}

impl Arg {
    /// Convert to plain data.
    ///
    /// Returns `None` for a callable. Inside lists a callable becomes
    /// `null` so positions are preserved; inside records the field is
    /// omitted.
    pub fn to_plain(&self) -> Option<Value> {
        match self {
            Arg::Data(value) => Some(value.clone()),
            Arg::Callable(_) => None,
            Arg::List(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.to_plain().unwrap_or(Value::Null))
                    .collect(),
            )),
            Arg::Record(fields) => Some(Value::Object(
                fields
                    .iter()
                    .filter_map(|(key, field)| field.to_plain().map(|v| (key.clone(), v)))
                    .collect(),
            )),
        }
    }

    /// Number of callables that serialization will drop
    pub fn callable_count(&self) -> usize {
        match self {
            Arg::Data(_) => 0,
            Arg::Callable(_) => 1,
            Arg::List(items) => items.iter().map(Arg::callable_count).sum(),
            Arg::Record(fields) => fields.values().map(Arg::callable_count).sum(),
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Data(value)
    }
}

impl From<Callable> for Arg {
    fn from(callable: Callable) -> Self {
        Arg::Callable(callable)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(items: Vec<Arg>) -> Self {
        Arg::List(items)
    }
}

impl From<BTreeMap<String, Arg>> for Arg {
    fn from(fields: BTreeMap<String, Arg>) -> Self {
        Arg::Record(fields)
    }
}

macro_rules! impl_arg_from_data {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Data(Value::from(value))
                }
            }
        )*
    };
}

impl_arg_from_data!(&str, String, bool, i32, i64, u32, u64, f64);

/// Build a `Vec<Arg>` from heterogeneous expressions.
///
/// ```
/// use contracts::{args, Arg};
///
/// let list: Vec<Arg> = args!["message", 1, true];
/// assert_eq!(list.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

/// A buffered event: name plus plain-data arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event name
    pub name: String,

    /// Ordered arguments
    pub args: Vec<Value>,
}

impl EventRecord {
    /// Create a record from already plain arguments
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Serialize emitted arguments.
    ///
    /// Top-level callables keep their position as `null`.
    pub fn from_args(name: impl Into<String>, args: &[Arg]) -> Self {
        let args = args
            .iter()
            .map(|arg| arg.to_plain().unwrap_or(Value::Null))
            .collect();
        Self::new(name, args)
    }

    /// Argument at `index`, if any
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}
