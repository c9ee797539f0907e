//! Integration tests for the VM
//!
//! Tests evaluation of compiled Bytelisp programs.

use bytelisp_foundation::{Environment, ErrorKind, Type, Value};
use bytelisp_language::{Vm, VmConfig, compile, eval};

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn eval_nested_arithmetic() {
    assert_eq!(eval("(+ 1 (* 2 3) 4)").unwrap(), Value::Number(11.0));
}

#[test]
fn eval_if() {
    assert_eq!(eval("(if false 2 3)").unwrap(), Value::Number(3.0));
    assert_eq!(eval("(if true 2 3)").unwrap(), Value::Number(2.0));
}

#[test]
fn if_condition_must_be_boolean() {
    for source in ["(if nil 2 3)", "(if 0 2 3)"] {
        let err = eval(source).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    }
}

#[test]
fn eval_let_scopes_bindings() {
    assert_eq!(eval("(let (a 2 b 3) (+ a b))").unwrap(), Value::Number(5.0));
    assert_eq!(eval("(let (a 2 b 3) (+ a b)) a").unwrap(), Value::Nil);
}

#[test]
fn eval_do_returns_last() {
    assert_eq!(eval("(do 1 2 3)").unwrap(), Value::Number(3.0));
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn eval_definition_and_call() {
    let source = "(def add_1 (fn (a) (+ a 1))) (add_1 6)";
    assert_eq!(eval(source).unwrap(), Value::Number(7.0));
    assert_eq!(eval(source).unwrap(), Value::Number(7.0));
}

#[test]
fn eval_fib() {
    let source = "(def fib (fn (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2)))))) (fib 10)";
    assert_eq!(eval(source).unwrap(), Value::Number(55.0));
}

#[test]
fn escaped_closure_keeps_environment() {
    let source = "(def make (fn (x) (fn () x))) ((make 4))";
    assert_eq!(eval(source).unwrap(), Value::Number(4.0));
}

#[test]
fn closures_capture_independently() {
    let source = "(def adder (fn (n) (fn (x) (+ x n))))
                  (def add2 (adder 2))
                  (def add5 (adder 5))
                  (+ (add2 1) (add5 1))";
    assert_eq!(eval(source).unwrap(), Value::Number(9.0));
}

#[test]
fn arity_violation_binds_nothing() {
    let code = compile("(def f (fn (p q) p)) (f 1)").unwrap();
    let env = Environment::root();
    let mut vm = Vm::new();
    let err = vm.run(&code, env.clone()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { .. }));
    assert_eq!(env.borrow().get("p"), Value::Nil);
    assert_eq!(env.borrow().get("q"), Value::Nil);
}

// =============================================================================
// Errors and stack discipline
// =============================================================================

#[test]
fn type_error_pushes_no_result() {
    let code = compile("(+ 1 \"a\")").unwrap();
    let mut vm = Vm::new();
    let err = vm.run(&code, Environment::root()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert!(vm.stack().is_empty());
}

#[test]
fn each_top_level_expression_leaves_one_value() {
    let code = compile("(def a 1) (let (b 2) b) (if (= a 1) 1 2) ((fn (x) x) 3) (do 1 2)").unwrap();
    let mut vm = Vm::new();
    vm.run(&code, Environment::root()).unwrap();
    assert_eq!(vm.stack().len(), 5);
    assert!(vm.stack().iter().all(|v| !matches!(v, Value::Frame(_))));
}

#[test]
fn calling_a_non_function_fails_at_runtime() {
    let err = eval("(def x 1) (x)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotCallable(Type::Number)));
    let err = eval("(nope 1)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotCallable(Type::Nil)));
}

#[test]
fn literal_callee_is_a_compile_error() {
    let err = eval("(1 2)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Compile { .. }));
}

#[test]
fn runaway_recursion_overflows_cleanly() {
    let code = compile("(def loop (fn (n) (+ 1 (loop n)))) (loop 1)").unwrap();
    let mut vm = Vm::with_config(VmConfig::new().with_max_stack(10_000));
    let err = vm.run(&code, Environment::root()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::StackOverflow(10_000)));
}

const CHAIN: &str = "(def mk (fn (self n g) (if (= n 0) g (self self (- n 1) (fn () (g))))))";

#[test]
fn deep_closure_chain_runs_and_is_freed() {
    let code = compile(&format!("{CHAIN} ((mk mk 20000 (fn () 1)))")).unwrap();
    let mut vm = Vm::new();
    assert_eq!(vm.run(&code, Environment::root()).unwrap(), Value::Number(1.0));
    vm.clear_stack();

    let code = compile(&format!("{CHAIN} (mk mk 100000 (fn () 1))")).unwrap();
    let mut vm = Vm::new();
    let chain = vm.run(&code, Environment::root()).unwrap();
    assert_eq!(chain.value_type(), Type::Fn);
    vm.clear_stack();
    drop(chain);
}
