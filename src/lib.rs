//! Bytelisp - A small Lisp compiled to bytecode
//!
//! This crate re-exports all layers of the Bytelisp system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: bytelisp_runtime    - Session, REPL, CLI, bytecode images
//! Layer 2: bytelisp_stdlib     - Core environment natives
//! Layer 1: bytelisp_language   - Scanner, compiler, bytecode VM
//! Layer 0: bytelisp_foundation - Core types (Value, Environment, Error)
//! ```

pub use bytelisp_foundation as foundation;
pub use bytelisp_language as language;
pub use bytelisp_runtime as runtime;
pub use bytelisp_stdlib as stdlib;
