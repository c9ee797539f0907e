//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Symbol, Environment, and Error.

mod env;
mod errors;
mod values;
