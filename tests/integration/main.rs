//! Cross-layer integration tests for Bytelisp
//!
//! Tests that verify correct interaction between multiple crates.

mod images;
mod programs;
mod session;
