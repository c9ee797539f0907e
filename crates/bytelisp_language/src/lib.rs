//! Scanner, single-pass bytecode compiler, and stack VM for Bytelisp.
//!
//! This crate provides:
//! - [`Scanner`] - Splits source text into span tokens
//! - [`Compiler`] - Emits bytecode straight from the token stream
//! - [`Code`] - The growable bytecode buffer and its [`OpCode`]s
//! - [`Vm`] - Stack-based bytecode interpreter

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod code;
pub mod compiler;
pub mod disasm;
pub mod scanner;
pub mod span;
pub mod token;
pub mod vm;

pub use code::{Code, OpCode, Word};
pub use compiler::{Compiler, compile};
pub use disasm::{disassemble, disassemble_instruction};
pub use scanner::Scanner;
pub use span::Span;
pub use token::{Token, TokenKind};
pub use vm::{Operator, TraceOutput, Vm, VmConfig, apply_operator, eval};
