//! Integration tests for Layer 1: Language
//!
//! Tests for the scanner, the bytecode compiler, and the VM.

mod compiler;
mod scanner;
mod vm;
