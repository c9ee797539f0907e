//! Bytecode images written to disk and run in a fresh session.

use std::env;
use std::fs;
use std::process;

use bytelisp_foundation::Value;
use bytelisp_runtime::{Session, from_bytes, load_from_file, save_to_file, to_bytes};

#[test]
fn compiled_session_runs_from_image() {
    let mut builder = Session::new();
    builder
        .compile("(def sq (fn (x) (* x x))) (def base 3)")
        .unwrap();
    builder.compile("(sq (+ base 4))").unwrap();

    let bytes = to_bytes(builder.code()).unwrap();
    let code = from_bytes(&bytes).unwrap();
    assert_eq!(code.as_bytes(), builder.code().as_bytes());

    let mut runner = Session::new();
    assert_eq!(runner.load_image(code).unwrap(), Value::Number(49.0));
    assert_eq!(runner.eval("(sq 2)").unwrap(), Value::Number(4.0));
}

#[test]
fn image_file_round_trip() {
    let path = env::temp_dir().join(format!("bytelisp-image-{}.blc", process::id()));
    let code = bytelisp_language::compile("(def make (fn (x) (fn () x))) ((make 8))").unwrap();

    save_to_file(&code, &path).unwrap();
    let loaded = load_from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let mut session = Session::new();
    assert_eq!(session.load_image(loaded).unwrap(), Value::Number(8.0));
}

#[test]
fn garbage_is_not_an_image() {
    assert!(from_bytes(b"not an image").is_err());
}
