//! Syntax highlighting for the REPL.

use std::borrow::Cow;

use bytelisp_language::Operator;

const RESET: &str = "\x1b[0m";
const COMMENT: &str = "\x1b[2;3m";
const STRING: &str = "\x1b[33m";
const NUMBER: &str = "\x1b[35m";
const SPECIAL: &str = "\x1b[32m";
const LITERAL: &str = "\x1b[34m";
const OPERATOR: &str = "\x1b[36m";
const PAREN: &str = "\x1b[1m";

/// Highlighter for Bytelisp source.
#[derive(Debug, Default)]
pub struct BytelispHighlighter;

impl BytelispHighlighter {
    /// Creates a new highlighter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Highlight a line of input.
    #[allow(clippy::unused_self)]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let mut result = String::with_capacity(line.len() * 2);
        let mut rest = line;

        while let Some(c) = rest.chars().next() {
            let len = match c {
                ';' => {
                    // Comments run to the end of the line.
                    let end = rest.find('\n').unwrap_or(rest.len());
                    paint(&mut result, COMMENT, &rest[..end]);
                    end
                }
                '"' => {
                    let end = string_end(rest);
                    paint(&mut result, STRING, &rest[..end]);
                    end
                }
                '(' | ')' => {
                    paint(&mut result, PAREN, &rest[..1]);
                    1
                }
                c if is_separator(c) => {
                    result.push(c);
                    c.len_utf8()
                }
                _ => {
                    let end = rest
                        .find(|c: char| is_separator(c) || matches!(c, '(' | ')' | '"' | ';'))
                        .unwrap_or(rest.len());
                    let atom = &rest[..end];
                    match atom_color(atom) {
                        Some(color) => paint(&mut result, color, atom),
                        None => result.push_str(atom),
                    }
                    end
                }
            };
            rest = &rest[len..];
        }

        Cow::Owned(result)
    }
}

fn paint(out: &mut String, color: &str, text: &str) {
    out.push_str(color);
    out.push_str(text);
    out.push_str(RESET);
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// Byte length of the string literal at the start of `text`, including both
/// quotes. An unterminated string runs to the end of `text`.
fn string_end(text: &str) -> usize {
    let mut escape_next = false;
    for (i, c) in text.char_indices().skip(1) {
        if escape_next {
            escape_next = false;
        } else if c == '\\' {
            escape_next = true;
        } else if c == '"' {
            return i + 1;
        }
    }
    text.len()
}

fn atom_color(atom: &str) -> Option<&'static str> {
    match atom {
        "def" | "let" | "do" | "if" | "fn" | "quote" | "eval" => Some(SPECIAL),
        "nil" | "true" | "false" => Some(LITERAL),
        _ if Operator::from_symbol(atom).is_some() => Some(OPERATOR),
        _ if looks_numeric(atom) => Some(NUMBER),
        _ => None,
    }
}

fn looks_numeric(atom: &str) -> bool {
    let digits = atom.strip_prefix('-').unwrap_or(atom);
    digits.starts_with(|c: char| c.is_ascii_digit())
}
