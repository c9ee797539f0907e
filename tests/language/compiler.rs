//! Integration tests for the compiler

use bytelisp_foundation::ErrorKind;
use bytelisp_language::{Code, Compiler, OpCode, compile, disassemble};

fn compile_err(source: &str) -> String {
    match compile(source) {
        Ok(_) => panic!("expected compile error for {source:?}"),
        Err(e) => {
            assert!(
                matches!(e.kind, ErrorKind::Compile { .. } | ErrorKind::Parse { .. }),
                "unexpected error kind: {e}"
            );
            e.to_string()
        }
    }
}

#[test]
fn compile_number_layout() {
    let code = compile("1").unwrap();
    assert_eq!(code.len(), 5);
    let mut offset = 0;
    assert_eq!(code.read_op(&mut offset).unwrap(), OpCode::PushNumber);
    assert_eq!(code.read_number(&mut offset).unwrap(), 1.0);
}

#[test]
fn compile_call_listing() {
    let listing = disassemble(&compile("(print 1)").unwrap()).unwrap();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(
        lines,
        vec![
            "0000  PUSH_SYMBOL   print",
            "0007  GET_SYMBOL",
            "0008  PUSH_NUMBER   1",
            "0013  CALL_FUNCTION 1",
        ]
    );
}

#[test]
fn two_argument_if_is_rejected() {
    assert!(compile_err("(if true 2)").contains("if requires 3 arguments"));
}

#[test]
fn structural_errors() {
    assert!(compile_err(")").contains("unexpected ')'"));
    assert!(compile_err("()").contains("empty form"));
    assert!(compile_err("(+ 1 2").contains("unterminated list"));
    assert!(compile_err("(def)").contains("at least one binding"));
    assert!(compile_err("(def 1 2)").contains("keys must be symbols"));
    assert!(compile_err("(let (a) a)").contains("has no value"));
    assert!(compile_err("(let (a 1))").contains("requires a body"));
    assert!(compile_err("(fn (1) 1)").contains("parameters must be symbols"));
    assert!(compile_err("(do)").contains("at least one expression"));
}

#[test]
fn reserved_forms_are_not_implemented() {
    for source in ["(quote a)", "(eval 1)"] {
        let err = compile(source).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NotImplemented(_)));
    }
}

#[test]
fn failed_compile_truncates_buffer() {
    let mut code = Code::new();
    Compiler::new(&mut code).compile("(def a 1)").unwrap();
    let len = code.len();
    assert!(Compiler::new(&mut code).compile("(def b (+ 1").is_err());
    assert_eq!(code.len(), len);
}

#[test]
fn string_escapes() {
    let code = compile(r#""tab\there""#).unwrap();
    let listing = disassemble(&code).unwrap();
    assert!(listing.starts_with("0000  PUSH_STRING"));
    assert!(compile_err(r#""\q""#).contains("unknown escape"));
}

#[test]
fn deep_nesting_is_an_error_not_a_crash() {
    let source = format!("{}1{}", "(+ ".repeat(5000), ")".repeat(5000));
    assert!(compile_err(&source).contains("nested too deeply"));
}
