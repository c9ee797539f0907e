//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use bytelisp_foundation::{Error, ErrorContext, ErrorKind, Type};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch(Type::Number, Type::String);
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("number"));
    assert!(msg.contains("string"));
}

#[test]
fn error_arity_mismatch() {
    let err = Error::arity_mismatch("2", 3);
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { .. }));
    let msg = format!("{err}");
    assert!(msg.contains('2'));
    assert!(msg.contains('3'));
}

#[test]
fn error_compile_has_position() {
    let err = Error::compile("if requires 3 arguments", 1, 4);
    assert_eq!(
        err.to_string(),
        "compile error at 1:4: if requires 3 arguments"
    );
}

#[test]
fn error_parse_has_position() {
    let err = Error::parse("unterminated string", 2, 7);
    assert!(matches!(err.kind, ErrorKind::Parse { line: 2, column: 7, .. }));
}

#[test]
fn error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err = Error::from(io);
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_display() {
    let ctx = ErrorContext::new().with_offset(12);
    assert_eq!(ctx.to_string(), "at offset 0012");
    let ctx = ctx.with_source("fib.bl");
    assert_eq!(ctx.to_string(), "in fib.bl at offset 0012");
}

#[test]
fn context_attaches_to_error() {
    let err = Error::new(ErrorKind::DivisionByZero).with_context(ErrorContext::new().with_offset(3));
    assert_eq!(err.context.and_then(|c| c.offset), Some(3));
}
