//! Command implementations.

mod exchange;
mod info;
mod validate;

pub use exchange::run_exchange;
pub use info::run_info;
pub use validate::run_validate;
