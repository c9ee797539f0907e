//! Session behavior across inputs.

use bytelisp_foundation::{ErrorKind, Type, Value};
use bytelisp_runtime::Session;
use proptest::prelude::*;

#[test]
fn closures_from_earlier_inputs_stay_callable() {
    let mut session = Session::new();
    session.eval("(def make (fn (x) (fn () x)))").unwrap();
    session.eval("(def four (make 4))").unwrap();
    session.eval("(def unused (+ 1 1))").unwrap();
    assert_eq!(session.eval("(four)").unwrap(), Value::Number(4.0));
}

#[test]
fn recursion_defined_in_one_input_runs_in_another() {
    let mut session = Session::new();
    session
        .eval("(def fib (fn (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2))))))")
        .unwrap();
    assert_eq!(session.eval("(fib 10)").unwrap(), Value::Number(55.0));
    assert_eq!(session.get("fib").value_type(), Type::Fn);
}

#[test]
fn errors_are_contained_to_their_input() {
    let mut session = Session::new();
    session.eval("(def total 10)").unwrap();

    let err = session.eval("(if total 1 2)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert!(err.context.and_then(|c| c.offset).is_some());

    assert!(session.eval("(def broken").is_err());
    assert_eq!(session.eval("(+ total 5)").unwrap(), Value::Number(15.0));
}

#[test]
fn redefinition_replaces_binding() {
    let mut session = Session::new();
    session.eval("(def f (fn () 1))").unwrap();
    session.eval("(def f (fn () 2))").unwrap();
    assert_eq!(session.eval("(f)").unwrap(), Value::Number(2.0));
}

proptest! {
    #[test]
    fn definitions_accumulate_across_inputs(values in prop::collection::vec(-1000i32..1000, 1..8)) {
        let mut session = Session::new();
        session.eval("(def total 0)").unwrap();
        for v in &values {
            session.eval(&format!("(def total (+ total {v}))")).unwrap();
        }
        let expected: i32 = values.iter().sum();
        #[allow(clippy::cast_precision_loss)]
        let expected = expected as f32;
        prop_assert_eq!(session.eval("total").unwrap(), Value::Number(expected));
        prop_assert!(session.vm().stack().is_empty());
    }
}
