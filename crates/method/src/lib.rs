//! # Method
//!
//! Generic single-dispatch registry.
//!
//! A [`Method`] selects one implementation per call from the runtime type
//! of its first argument, without requiring the dispatched values to share
//! a base type or to be mutable:
//! - per-instance implementations (`implement`)
//! - per-type implementations, inherited along the tag's ancestor chain (`define`)
//! - a shared default (`define_default`)
//!
//! ## Example
//!
//! ```
//! use method::Method;
//! use contracts::NUMBER;
//!
//! let describe: Method<(), &'static str> = Method::with_default("describe", |_, ()| Ok("thing"));
//! describe.define(&NUMBER, |_, ()| Ok("number"));
//!
//! assert_eq!(describe.call(&5, ()).unwrap(), "number");
//! assert_eq!(describe.call(&"five", ()).unwrap(), "thing");
//! ```

mod error;
mod method;

pub use error::DispatchError;
pub use method::{Implementation, Method};
