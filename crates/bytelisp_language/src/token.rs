//! Token types for Bytelisp.
//!
//! Tokens are the output of the scanner and the input of the compiler. They
//! carry no decoded payload: the compiler classifies atoms from their text.

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    /// The type of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    /// Returns true for the end-of-input sentinel.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End)
    }
}

/// Token types for Bytelisp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// A bare atom: `nil`, `true`, `false`, a number, or a symbol.
    Atom,
    /// A double-quoted string. The span includes both quotes and escapes
    /// are left unresolved.
    String,
    /// Sentinel terminating every token stream.
    End,
}
