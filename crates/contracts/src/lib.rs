//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace.
//! Business crates depend on this crate only, reverse dependencies are prohibited.
//!
//! ## Payload Model
//! - Event payloads are plain data (`serde_json::Value`)
//! - Callers may hand callables to `emit`, they are dropped on serialization
//!
//! ## Type Model
//! - Runtime types are described by static [`TypeTag`]s with explicit parents
//! - Any `'static` value implementing [`Typed`] can be dispatched on

mod config;
mod error;
mod payload;
mod stats;
mod type_tag;

pub use config::*;
pub use error::*;
pub use payload::*;
pub use stats::PortStats;
pub use type_tag::*;
