//! Core library natives for Bytelisp.
//!
//! This crate provides the environment programs normally run in:
//! - Output functions (`print`, `println`)
//! - The nine operators as first-class natives (`+`, `-`, `<`, ...)
//!
//! Operator calls written directly in source compile to VM opcodes; the
//! natives here cover operators used as values, e.g. `(def add +)`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod io;
mod ops;

pub use io::write_values;

use bytelisp_foundation::{EnvRef, Environment, NativeFn, Result, Symbol, Value};
use bytelisp_language::{Vm, compile};

/// Every native in the core library.
pub const NATIVES: &[NativeFn] = &[
    NativeFn::new("print", io::print),
    NativeFn::new("println", io::println),
    NativeFn::new("=", ops::eq),
    NativeFn::new("<", ops::less),
    NativeFn::new("<=", ops::less_eq),
    NativeFn::new(">", ops::greater),
    NativeFn::new(">=", ops::greater_eq),
    NativeFn::new("+", ops::add),
    NativeFn::new("-", ops::sub),
    NativeFn::new("*", ops::mul),
    NativeFn::new("/", ops::div),
];

/// Binds every core native in `env`.
pub fn register(env: &EnvRef) {
    let mut env = env.borrow_mut();
    for native in NATIVES {
        env.set(Symbol::new(native.name), Value::Native(*native));
    }
}

/// Creates a root environment holding the core library.
#[must_use]
pub fn make_core() -> EnvRef {
    let core = Environment::root();
    register(&core);
    core
}

/// Compiles and runs `source` against a fresh core environment.
///
/// # Errors
///
/// Returns the first compile or runtime error.
pub fn eval_with_core(source: &str) -> Result<Value> {
    let code = compile(source)?;
    Vm::new().run(&code, make_core())
}
