//! CLI utilities module
//!
//! Shared validation, display formatting and error handling for commands.

pub mod display;
pub mod error;
pub mod validation;

pub use display::*;
pub use error::*;
pub use validation::*;
