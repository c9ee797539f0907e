//! REPL, CLI, and bytecode images for Bytelisp.
//!
//! This crate provides:
//! - [`Session`] - One growing bytecode buffer run against a persistent
//!   core environment
//! - [`Repl`] - Interactive read-eval-print loop
//! - Bytecode image serialization and deserialization

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod editor;
pub mod highlight;
pub mod repl;
pub mod serialize;
pub mod session;

pub use config::RuntimeConfig;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use highlight::BytelispHighlighter;
pub use repl::Repl;
pub use serialize::{ImageError, from_bytes, load_from_file, save_to_file, to_bytes};
pub use session::Session;
