//! Integration tests for the scanner

use bytelisp_foundation::ErrorKind;
use bytelisp_language::{Scanner, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Scanner::tokenize(source)
        .unwrap()
        .iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn scan_a_definition() {
    use TokenKind::{Atom, End, LParen, RParen};
    assert_eq!(
        kinds("(def add_1 (fn (a) (+ a 1)))"),
        vec![
            LParen, Atom, Atom, LParen, Atom, LParen, Atom, RParen, LParen, Atom, Atom, Atom,
            RParen, RParen, RParen, End
        ]
    );
}

#[test]
fn token_text_round_trips_through_spans() {
    let source = "(println \"a b\" -2.5)";
    let mut scanner = Scanner::new(source).unwrap();
    let mut texts = Vec::new();
    loop {
        let token = scanner.next();
        if token.is_end() {
            break;
        }
        texts.push(scanner.text(token));
    }
    assert_eq!(texts, vec!["(", "println", "\"a b\"", "-2.5", ")"]);
}

#[test]
fn commas_and_comments_are_whitespace() {
    assert_eq!(
        kinds("1, 2 ; three\n4"),
        vec![TokenKind::Atom, TokenKind::Atom, TokenKind::Atom, TokenKind::End]
    );
}

#[test]
fn end_is_sticky() {
    let mut scanner = Scanner::new("x").unwrap();
    scanner.next();
    assert!(scanner.next().is_end());
    assert!(scanner.next().is_end());
    assert!(scanner.peek().is_end());
}

#[test]
fn unterminated_string_reports_position() {
    let err = Scanner::tokenize("(print\n  \"oops)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parse { line: 2, .. }));
}
