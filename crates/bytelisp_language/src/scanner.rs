//! Scanner for Bytelisp.
//!
//! The scanner converts source text into a flat array of span tokens,
//! always terminated by a single [`TokenKind::End`] sentinel. The compiler
//! walks that array with [`Scanner::peek`] and [`Scanner::next`].

use bytelisp_foundation::{Error, Result};

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Tokenized source plus a read cursor.
pub struct Scanner<'src> {
    /// Source text the token spans point into.
    source: &'src str,
    /// All tokens, ending with `End`.
    tokens: Vec<Token>,
    /// Index of the next token to hand out.
    current: usize,
}

impl<'src> Scanner<'src> {
    /// Tokenizes `source`.
    ///
    /// # Errors
    ///
    /// Returns a parse error for an unterminated string.
    pub fn new(source: &'src str) -> Result<Self> {
        let tokens = Self::tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            current: 0,
        })
    }

    /// Tokenizes all source and returns the tokens, ending with `End`.
    ///
    /// # Errors
    ///
    /// Returns a parse error for an unterminated string.
    pub fn tokenize(source: &str) -> Result<Vec<Token>> {
        let mut cursor = Cursor::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = cursor.next_token()?;
            let is_end = token.is_end();
            tokens.push(token);
            if is_end {
                return Ok(tokens);
            }
        }
    }

    /// Returns the source text.
    #[must_use]
    pub const fn source(&self) -> &'src str {
        self.source
    }

    /// Returns all tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Token {
        self.tokens[self.current]
    }

    /// Consumes and returns the next token. Once the cursor reaches `End` it
    /// stays there.
    pub fn next(&mut self) -> Token {
        let token = self.tokens[self.current];
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
        token
    }

    /// Returns the text of a token.
    #[must_use]
    pub fn text(&self, token: Token) -> &'src str {
        token.text(self.source)
    }
}

/// Character-level cursor producing one token at a time.
struct Cursor<'src> {
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
}

impl<'src> Cursor<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();

        let start = self.position;
        let line = self.line;
        let column = self.column;

        let Some(c) = self.peek_char() else {
            return Ok(Token::new(
                TokenKind::End,
                Span::new(start, start, line, column),
            ));
        };

        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '"' => {
                self.scan_string(line, column)?;
                TokenKind::String
            }
            _ => {
                self.scan_atom();
                TokenKind::Atom
            }
        };

        Ok(Token::new(
            kind,
            Span::new(start, self.position, line, column),
        ))
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Skips whitespace (including commas) and `;` comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_char() {
            if is_whitespace(c) {
                self.advance();
            } else if c == ';' {
                while let Some(c) = self.peek_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Consumes a string literal, leaving escapes for the compiler.
    fn scan_string(&mut self, line: u32, column: u32) -> Result<()> {
        self.advance(); // opening '"'
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    return Ok(());
                }
                Some('\\') => {
                    self.advance();
                    if self.peek_char().is_none() {
                        break;
                    }
                    self.advance();
                }
                Some(_) => self.advance(),
                None => break,
            }
        }
        Err(Error::parse("unterminated string", line, column))
    }

    fn scan_atom(&mut self) {
        while let Some(c) = self.peek_char() {
            if is_whitespace(c) || matches!(c, '(' | ')' | '"' | ';') {
                break;
            }
            self.advance();
        }
    }
}

/// Commas count as whitespace.
fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == ','
}
