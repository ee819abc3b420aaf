//! Runtime type tags
//!
//! Dispatch needs a runtime notion of "type" with ancestors. Each type is
//! described by a `static` [`TypeTag`] holding an explicit parent link, so
//! the ancestor chain is finite and known at registration time.
//!
//! `null` and `undefined` are sentinel tags: they have no parent and never
//! inherit implementations registered for other tags.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::Callable;

/// Static runtime type descriptor.
///
/// Tags must be declared as `static` items: identity is the item's address.
///
/// ```
/// use contracts::{TypeTag, OBJECT};
///
/// static INBOX: TypeTag = TypeTag::extends("Inbox", &OBJECT);
///
/// assert!(INBOX.is_a(&OBJECT));
/// assert_eq!(INBOX.ancestors().count(), 2);
/// ```
#[derive(Debug)]
pub struct TypeTag {
    name: &'static str,
    parent: Option<&'static TypeTag>,
    sentinel: bool,
}

impl TypeTag {
    /// Tag without ancestors (does not inherit `Object` implementations)
    pub const fn root(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            sentinel: false,
        }
    }

    /// Tag inheriting from `parent`
    pub const fn extends(name: &'static str, parent: &'static TypeTag) -> Self {
        Self {
            name,
            parent: Some(parent),
            sentinel: false,
        }
    }

    const fn sentinel(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            sentinel: true,
        }
    }

    /// Type name, used in error messages
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Direct parent, if any
    pub fn parent(&self) -> Option<&'static TypeTag> {
        self.parent
    }

    /// Whether this is the `null` or `undefined` tag
    pub fn is_sentinel(&self) -> bool {
        self.sentinel
    }

    /// Identity key for lookup tables
    pub fn key(&'static self) -> TypeKey {
        TypeKey(self as *const TypeTag as usize)
    }

    /// Walk from this tag outward to its root, self included
    pub fn ancestors(&'static self) -> Ancestors {
        Ancestors { next: Some(self) }
    }

    /// Whether `other` is this tag or one of its ancestors
    pub fn is_a(&'static self, other: &'static TypeTag) -> bool {
        self.ancestors().any(|tag| std::ptr::eq(tag, other))
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for TypeTag {}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a tag's ancestor chain
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<&'static TypeTag>,
}

impl Iterator for Ancestors {
    type Item = &'static TypeTag;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

/// Hashable identity of a [`TypeTag`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey(usize);

// ===== Built-in tags =====

/// `null`
pub static NULL: TypeTag = TypeTag::sentinel("null");
/// `undefined` (absent value)
pub static UNDEFINED: TypeTag = TypeTag::sentinel("undefined");
/// Root of every ordinary value
pub static OBJECT: TypeTag = TypeTag::root("Object");
/// Integer and float primitives
pub static NUMBER: TypeTag = TypeTag::extends("Number", &OBJECT);
/// `bool`
pub static BOOLEAN: TypeTag = TypeTag::extends("Boolean", &OBJECT);
/// Owned and static strings
pub static STRING: TypeTag = TypeTag::extends("String", &OBJECT);
/// Sequences
pub static ARRAY: TypeTag = TypeTag::extends("Array", &OBJECT);
/// Callables
pub static FUNCTION: TypeTag = TypeTag::extends("Function", &OBJECT);
/// String-keyed Rust maps
pub static MAP: TypeTag = TypeTag::extends("Map", &OBJECT);

/// Per-instance identity, allocated once and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value that can be dispatched on
pub trait Typed: Any {
    /// Runtime type of this value
    fn type_tag(&self) -> &'static TypeTag;

    /// Identity for per-instance implementations (`None` = no identity)
    fn instance_id(&self) -> Option<InstanceId> {
        None
    }
}

impl dyn Typed {
    /// Downcast to the concrete type
    pub fn downcast_ref<T: Typed>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    /// Name of the runtime type
    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }
}

macro_rules! impl_typed {
    ($tag:ident => $($ty:ty),* $(,)?) => {
        $(
            impl Typed for $ty {
                fn type_tag(&self) -> &'static TypeTag {
                    &$tag
                }
            }
        )*
    };
}

impl_typed!(NUMBER => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
impl_typed!(BOOLEAN => bool);
impl_typed!(STRING => String, &'static str);
impl_typed!(UNDEFINED => ());
impl_typed!(FUNCTION => Callable);

impl<T: 'static> Typed for Vec<T> {
    fn type_tag(&self) -> &'static TypeTag {
        &ARRAY
    }
}

impl<V: 'static, S: 'static> Typed for HashMap<String, V, S> {
    fn type_tag(&self) -> &'static TypeTag {
        &MAP
    }
}

impl<V: 'static> Typed for BTreeMap<String, V> {
    fn type_tag(&self) -> &'static TypeTag {
        &MAP
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_tag(&self) -> &'static TypeTag {
        match self {
            Some(value) => value.type_tag(),
            None => &UNDEFINED,
        }
    }

    fn instance_id(&self) -> Option<InstanceId> {
        self.as_ref().and_then(|value| value.instance_id())
    }
}

impl Typed for Value {
    fn type_tag(&self) -> &'static TypeTag {
        match self {
            Value::Null => &NULL,
            Value::Bool(_) => &BOOLEAN,
            Value::Number(_) => &NUMBER,
            Value::String(_) => &STRING,
            Value::Array(_) => &ARRAY,
            Value::Object(_) => &OBJECT,
        }
    }
}
