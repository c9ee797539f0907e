//! Core values, environments, and errors for Bytelisp.
//!
//! This crate provides:
//! - [`Value`] - The tagged runtime value shared by the compiler and VM
//! - [`Symbol`] - Shared text with a precomputed hash (symbols and strings)
//! - [`Environment`] - Lexical scopes linked into a chain
//! - [`Type`] - Value type tags used in error messages
//! - [`Error`] - Error types with optional context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod env;
pub mod error;
pub mod symbol;
pub mod types;
pub mod value;

pub use env::{EnvRef, Environment};
pub use error::{Error, ErrorContext, ErrorKind};
pub use symbol::Symbol;
pub use types::Type;
pub use value::{Closure, FrameState, NativeFn, NativeFnPtr, Number, Value};

/// Result type for Bytelisp operations.
pub type Result<T> = std::result::Result<T, Error>;
