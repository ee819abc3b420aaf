//! Method - dispatch table keyed by runtime type

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use contracts::{InstanceId, TypeKey, TypeTag, Typed};
use tracing::{debug, trace};

use crate::error::DispatchError;

/// Implementation registered on a [`Method`].
///
/// Receives the dispatched value and the remaining arguments.
pub type Implementation<A, R> = Rc<dyn Fn(&dyn Typed, A) -> Result<R, DispatchError>>;

struct Table<A, R> {
    default: Option<Implementation<A, R>>,
    by_type: HashMap<TypeKey, Implementation<A, R>>,
    by_instance: HashMap<InstanceId, Implementation<A, R>>,
}

impl<A, R> Table<A, R> {
    fn new() -> Self {
        Self {
            default: None,
            by_type: HashMap::new(),
            by_instance: HashMap::new(),
        }
    }

    /// Instance -> tag chain -> default. Sentinels only match their own tag.
    fn lookup(&self, value: &dyn Typed) -> Option<Implementation<A, R>> {
        let tag = value.type_tag();

        let specific = if tag.is_sentinel() {
            self.by_type.get(&tag.key()).cloned()
        } else {
            value
                .instance_id()
                .and_then(|id| self.by_instance.get(&id).cloned())
                .or_else(|| {
                    tag.ancestors()
                        .find_map(|ancestor| self.by_type.get(&ancestor.key()).cloned())
                })
        };

        specific.or_else(|| self.default.clone())
    }
}

/// Single-dispatch function.
///
/// Cloning a `Method` yields another handle to the same table, so
/// implementations registered through one handle are visible through all.
/// Registrations live in the method's own table and never touch the
/// dispatched values.
pub struct Method<A = (), R = ()> {
    name: Rc<str>,
    table: Rc<RefCell<Table<A, R>>>,
}

impl<A, R> Clone for Method<A, R> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            table: Rc::clone(&self.table),
        }
    }
}

impl<A, R> fmt::Debug for Method<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("has_default", &table.default.is_some())
            .field("types", &table.by_type.len())
            .field("instances", &table.by_instance.len())
            .finish()
    }
}

impl<A: 'static, R: 'static> Method<A, R> {
    /// Create a method without any implementation
    pub fn new(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            table: Rc::new(RefCell::new(Table::new())),
        }
    }

    /// Create a method with a default implementation
    pub fn with_default<F>(name: &str, implementation: F) -> Self
    where
        F: Fn(&dyn Typed, A) -> Result<R, DispatchError> + 'static,
    {
        let method = Self::new(name);
        method.define_default(implementation);
        method
    }

    /// Method name, used in errors and logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set or replace the default implementation
    pub fn define_default<F>(&self, implementation: F) -> &Self
    where
        F: Fn(&dyn Typed, A) -> Result<R, DispatchError> + 'static,
    {
        self.table.borrow_mut().default = Some(Rc::new(implementation));
        debug!(method = %self.name, "Default implementation defined");
        self
    }

    /// Associate an implementation with a type tag.
    ///
    /// Values whose tag descends from `tag` inherit it unless a more
    /// specific implementation exists.
    pub fn define<F>(&self, tag: &'static TypeTag, implementation: F) -> &Self
    where
        F: Fn(&dyn Typed, A) -> Result<R, DispatchError> + 'static,
    {
        self.table
            .borrow_mut()
            .by_type
            .insert(tag.key(), Rc::new(implementation));
        debug!(method = %self.name, type_name = tag.name(), "Type implementation defined");
        self
    }

    /// Associate an implementation with one specific value.
    ///
    /// `null`/`undefined` values have no identity of their own: the
    /// implementation is defined for their sentinel tag instead.
    ///
    /// # Errors
    /// [`DispatchError::NoIdentity`] if the value reports no instance id.
    pub fn implement<F>(&self, value: &dyn Typed, implementation: F) -> Result<&Self, DispatchError>
    where
        F: Fn(&dyn Typed, A) -> Result<R, DispatchError> + 'static,
    {
        let tag = value.type_tag();
        if tag.is_sentinel() {
            return Ok(self.define(tag, implementation));
        }

        let id = value.instance_id().ok_or_else(|| DispatchError::NoIdentity {
            method: self.name.to_string(),
            type_name: tag.name().to_string(),
        })?;

        self.table
            .borrow_mut()
            .by_instance
            .insert(id, Rc::new(implementation));
        debug!(
            method = %self.name,
            type_name = tag.name(),
            instance = %id,
            "Instance implementation defined"
        );
        Ok(self)
    }

    /// Implementation selected for `value`, without calling it
    pub fn resolve(&self, value: &dyn Typed) -> Option<Implementation<A, R>> {
        self.table.borrow().lookup(value)
    }

    /// Whether any implementation applies to `value`
    pub fn is_implemented(&self, value: &dyn Typed) -> bool {
        self.resolve(value).is_some()
    }

    /// Dispatch on `value`.
    ///
    /// # Errors
    /// - [`DispatchError::NotImplemented`] if nothing applies
    /// - whatever the selected implementation returns
    pub fn call(&self, value: &dyn Typed, args: A) -> Result<R, DispatchError> {
        // Borrow released before invoking: implementations may register more.
        let implementation = self.resolve(value).ok_or_else(|| {
            DispatchError::not_implemented(&*self.name, value.type_name())
        })?;

        trace!(method = %self.name, type_name = value.type_name(), "Dispatching");
        implementation(value, args)
    }
}
