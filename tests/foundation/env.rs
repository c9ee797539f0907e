//! Integration tests for Environment

use bytelisp_foundation::{Environment, Symbol, Value};

#[test]
fn chain_lookup_and_shadowing() {
    let root = Environment::root();
    root.borrow_mut().set(Symbol::new("x"), Value::Number(1.0));
    root.borrow_mut().set(Symbol::new("y"), Value::Number(2.0));

    let inner = Environment::child(&root);
    inner.borrow_mut().set(Symbol::new("x"), Value::Number(10.0));

    assert_eq!(inner.borrow().get("x"), Value::Number(10.0));
    assert_eq!(inner.borrow().get("y"), Value::Number(2.0));
    assert_eq!(root.borrow().get("x"), Value::Number(1.0));
}

#[test]
fn unbound_is_nil() {
    let env = Environment::child(&Environment::root());
    assert_eq!(env.borrow().get("missing"), Value::Nil);
    assert_eq!(env.borrow().lookup("missing"), None);
}

#[test]
fn binding_nil_is_still_a_binding() {
    let env = Environment::root();
    env.borrow_mut().set(Symbol::new("n"), Value::Nil);
    assert!(env.borrow().contains("n"));
    assert_eq!(env.borrow().len(), 1);
}

#[test]
fn depth_counts_enclosing_scopes() {
    let mut env = Environment::root();
    for _ in 0..5 {
        env = Environment::child(&env);
    }
    assert_eq!(env.borrow().depth(), 5);
    assert!(env.borrow().outer().is_some());
}
