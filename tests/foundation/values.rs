//! Integration tests for Value and Symbol

use std::rc::Rc;

use bytelisp_foundation::{Closure, Environment, NativeFn, Symbol, Type, Value};

fn noop(stack: &mut Vec<Value>) -> bytelisp_foundation::Result<()> {
    stack.push(Value::Nil);
    Ok(())
}

// =============================================================================
// Equality
// =============================================================================

#[test]
fn nil_and_bools_compare_by_tag() {
    assert_eq!(Value::Nil, Value::Nil);
    assert_eq!(Value::Bool(true), Value::from(true));
    assert_ne!(Value::Bool(true), Value::Bool(false));
    assert_ne!(Value::Nil, Value::Bool(false));
}

#[test]
fn numbers_compare_by_value() {
    assert_eq!(Value::Number(0.5), Value::Number(1.0 / 2.0));
    assert_ne!(Value::Number(1.0), Value::Bool(true));
}

#[test]
fn text_compares_by_bytes_within_a_tag() {
    assert_eq!(Value::string("abc"), Value::from(String::from("abc")));
    assert_eq!(Value::symbol("abc"), Value::symbol("abc"));
    assert_ne!(Value::string("abc"), Value::symbol("abc"));
}

#[test]
fn closures_compare_by_identity() {
    let closure = Rc::new(Closure {
        env: Environment::root(),
        params: Vec::new(),
        body: 0,
    });
    let twin = Rc::new(Closure {
        env: Environment::root(),
        params: Vec::new(),
        body: 0,
    });
    assert_eq!(Value::Closure(closure.clone()), Value::Closure(closure.clone()));
    assert_ne!(Value::Closure(closure), Value::Closure(twin));
}

// =============================================================================
// Types and Display
// =============================================================================

#[test]
fn type_tags() {
    let native = Value::from(NativeFn::new("noop", noop));
    assert_eq!(native.value_type(), Type::Native);
    assert!(native.value_type().is_callable());
    assert!(!Value::string("x").value_type().is_callable());
}

#[test]
fn display_forms() {
    assert_eq!(Value::Nil.to_string(), "nil");
    assert_eq!(Value::Number(-3.0).to_string(), "-3");
    assert_eq!(Value::Number(1.25).to_string(), "1.25");
    assert_eq!(Value::string("hello").to_string(), "hello");
    assert_eq!(Value::symbol("fib").to_string(), "fib");
}

#[test]
fn accessors() {
    assert_eq!(Value::Number(2.0).as_number(), Some(2.0));
    assert_eq!(Value::string("s").as_str(), Some("s"));
    assert_eq!(Value::symbol("s").as_str(), None);
    assert_eq!(Value::Bool(true).as_bool(), Some(true));
    assert!(Value::Nil.is_nil());
}

#[test]
fn symbol_hash_is_stable() {
    let a = Symbol::new("println");
    let b = Symbol::from(String::from("println"));
    assert_eq!(a.hash_code(), b.hash_code());
    assert_eq!(a.len(), 7);
}
