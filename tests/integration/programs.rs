//! Whole programs run against the core environment.

use bytelisp_foundation::{ErrorKind, Value};
use bytelisp_stdlib::{eval_with_core, write_values};

fn run(source: &str) -> Value {
    eval_with_core(source).unwrap()
}

#[test]
fn fib_with_core() {
    let source = "
        ; naive recursion
        (def fib (fn (n)
          (if (< n 2)
              n
              (+ (fib (- n 1)) (fib (- n 2))))))
        (fib 15)";
    assert_eq!(run(source), Value::Number(610.0));
}

#[test]
fn operators_are_first_class() {
    assert_eq!(run("(def apply2 (fn (f a b) (f a b))) (apply2 * 6 7)"), Value::Number(42.0));
    assert_eq!(run("(def lt <) (lt 1 2)"), Value::Bool(true));
}

#[test]
fn higher_order_counter() {
    let source = "
        (def compose (fn (f g) (fn (x) (f (g x)))))
        (def inc (fn (x) (+ x 1)))
        (def dbl (fn (x) (* x 2)))
        ((compose inc dbl) 5)";
    assert_eq!(run(source), Value::Number(11.0));
}

#[test]
fn let_shadows_and_restores() {
    let source = "(def x 1) (let (x 10) (+ x 1)) x";
    assert_eq!(run(source), Value::Number(1.0));
}

#[test]
fn nested_lets_see_outer_bindings() {
    assert_eq!(
        run("(let (a 1) (let (b 2) (let (c 3) (+ a b c))))"),
        Value::Number(6.0)
    );
}

#[test]
fn println_returns_nil() {
    assert_eq!(run("(println \"\")"), Value::Nil);
}

#[test]
fn print_rejects_non_printables() {
    let err = eval_with_core("(print \"a\" true)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn output_format() {
    let mut out = Vec::new();
    write_values(
        &mut out,
        &[Value::string("fib: "), Value::Number(55.0), Value::Number(0.5)],
        true,
    )
    .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "fib: 550.5\n");
}

#[test]
fn division_by_zero() {
    let err = eval_with_core("(/ 1 0)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DivisionByZero));
}
