//! Single-pass compiler from source text to bytecode.
//!
//! There is no syntax tree: each form is emitted as soon as its head token
//! is seen. Forward jumps and function headers reserve fixed-width words
//! that are patched once their targets are known.

use bytelisp_foundation::{Error, ErrorKind, Number, Result};

use crate::code::{Code, OpCode, Word};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};
use crate::vm::Operator;

/// Compiles a complete program into a fresh buffer.
///
/// # Errors
///
/// Returns the first scan or compile error.
pub fn compile(source: &str) -> Result<Code> {
    let mut code = Code::new();
    Compiler::new(&mut code).compile(source)?;
    Ok(code)
}

/// Deepest form nesting the compiler accepts.
pub const MAX_NESTING: usize = 512;

/// Appends compiled programs to a bytecode buffer.
pub struct Compiler<'code> {
    code: &'code mut Code,
    depth: usize,
}

/// A classified atom token.
#[derive(Debug, PartialEq)]
enum Atom<'src> {
    Nil,
    True,
    False,
    Number(Number),
    Symbol(&'src str),
}

impl<'code> Compiler<'code> {
    /// Creates a compiler that appends to `code`.
    pub fn new(code: &'code mut Code) -> Self {
        Self { code, depth: 0 }
    }

    /// Compiles every top-level expression in `source`, appending to the
    /// buffer. Each top-level expression leaves one value on the stack.
    ///
    /// On error the buffer is restored to its previous length.
    ///
    /// # Errors
    ///
    /// Returns the first scan or compile error.
    pub fn compile(&mut self, source: &str) -> Result<()> {
        let mark = self.code.len();
        let result = Scanner::new(source).and_then(|mut scanner| self.program(&mut scanner));
        if result.is_err() {
            self.code.truncate(mark);
        }
        result
    }

    fn program(&mut self, scanner: &mut Scanner<'_>) -> Result<()> {
        while !scanner.peek().is_end() {
            self.expression(scanner)?;
        }
        Ok(())
    }

    fn expression(&mut self, scanner: &mut Scanner<'_>) -> Result<()> {
        let token = scanner.next();
        match token.kind {
            TokenKind::LParen => self.nested(scanner, token),
            TokenKind::RParen => Err(error_at(token, "unexpected ')'")),
            TokenKind::End => Err(error_at(token, "unexpected end of input")),
            TokenKind::String => self.string(scanner, token),
            TokenKind::Atom => match classify(token, scanner.text(token))? {
                Atom::Nil => {
                    self.code.write_op(OpCode::PushNil);
                    Ok(())
                }
                Atom::True => {
                    self.code.write_op(OpCode::PushTrue);
                    Ok(())
                }
                Atom::False => {
                    self.code.write_op(OpCode::PushFalse);
                    Ok(())
                }
                Atom::Number(n) => {
                    self.code.write_op(OpCode::PushNumber);
                    self.code.write_number(n);
                    Ok(())
                }
                Atom::Symbol(name) => self.lookup(token, name),
            },
        }
    }

    fn nested(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(error_at(open, "forms nested too deeply"));
        }
        self.depth += 1;
        let result = self.form(scanner, open);
        self.depth -= 1;
        result
    }

    /// Dispatches a form whose `(` has just been consumed.
    fn form(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
        let head = scanner.peek();
        match head.kind {
            TokenKind::RParen => Err(error_at(open, "empty form '()'")),
            TokenKind::End => Err(error_at(open, "unterminated list")),
            TokenKind::Atom => {
                let text = scanner.text(head);
                if matches!(text, "eval" | "quote") {
                    return Err(Error::new(ErrorKind::NotImplemented(text.to_string())));
                }
                if let Some(op) = Operator::from_symbol(text) {
                    scanner.next();
                    return self.operator(scanner, open, op);
                }
                let emit: fn(&mut Self, &mut Scanner<'_>, Token) -> Result<()> = match text {
                    "def" => Self::def,
                    "let" => Self::let_form,
                    "do" => Self::do_form,
                    "if" => Self::if_form,
                    "fn" => Self::fn_form,
                    _ => return self.call(scanner, open),
                };
                scanner.next();
                emit(self, scanner, open)
            }
            TokenKind::LParen | TokenKind::String => self.call(scanner, open),
        }
    }

    /// `(def key value [key value ...])`
    fn def(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
        let mut count = 0;
        loop {
            let token = scanner.peek();
            match token.kind {
                TokenKind::RParen if count > 0 => {
                    scanner.next();
                    return Ok(());
                }
                TokenKind::RParen => {
                    return Err(error_at(open, "def requires at least one binding"));
                }
                TokenKind::End => return Err(error_at(open, "unterminated list")),
                _ => {}
            }
            if count > 0 {
                self.code.write_op(OpCode::Pop);
            }
            self.binding(scanner, open, "def")?;
            count += 1;
        }
    }

    /// `(let (key value ...) body)`
    fn let_form(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
        let list = scanner.next();
        if list.kind != TokenKind::LParen {
            return Err(error_at(list, "let requires a binding list"));
        }
        self.code.write_op(OpCode::NewEnv);
        loop {
            let token = scanner.peek();
            match token.kind {
                TokenKind::RParen => {
                    scanner.next();
                    break;
                }
                TokenKind::End => return Err(error_at(list, "unterminated list")),
                _ => {}
            }
            self.binding(scanner, list, "let")?;
            self.code.write_op(OpCode::Pop);
        }
        self.body(scanner, open, "let")?;
        self.code.write_op(OpCode::Return);
        Ok(())
    }

    /// `(do expr ...)`
    fn do_form(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
        let mut count = 0;
        loop {
            let token = scanner.peek();
            match token.kind {
                TokenKind::RParen if count > 0 => {
                    scanner.next();
                    return Ok(());
                }
                TokenKind::RParen => {
                    return Err(error_at(open, "do requires at least one expression"));
                }
                TokenKind::End => return Err(error_at(open, "unterminated list")),
                _ => {}
            }
            if count > 0 {
                self.code.write_op(OpCode::Pop);
            }
            self.expression(scanner)?;
            count += 1;
        }
    }

    /// `(if cond then else)`
    fn if_form(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
        self.argument(scanner, open, "if requires 3 arguments")?;

        let to_else = self.jump(OpCode::JumpIfFalse);
        self.argument(scanner, open, "if requires 3 arguments")?;
        let to_end = self.jump(OpCode::Jump);

        self.patch_jump(to_else, open)?;
        self.argument(scanner, open, "if requires 3 arguments")?;
        self.patch_jump(to_end, open)?;

        expect_close(scanner, open)
    }

    /// `(fn (params ...) body)`
    fn fn_form(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
        let start = self.code.len();
        self.code.write_op(OpCode::MakeFunction);
        self.code.write_word(0);
        self.code.write_word(0);

        let list = scanner.next();
        if list.kind != TokenKind::LParen {
            return Err(error_at(list, "fn requires a parameter list"));
        }
        let mut argc: usize = 0;
        loop {
            let token = scanner.next();
            match token.kind {
                TokenKind::RParen => break,
                TokenKind::End => return Err(error_at(list, "unterminated list")),
                TokenKind::Atom => match classify(token, scanner.text(token))? {
                    Atom::Symbol(name) => {
                        self.chars(token, name)?;
                        argc += 1;
                    }
                    _ => return Err(error_at(token, "fn parameters must be symbols")),
                },
                TokenKind::LParen | TokenKind::String => {
                    return Err(error_at(token, "fn parameters must be symbols"));
                }
            }
        }

        self.body(scanner, open, "fn")?;
        self.code.write_op(OpCode::Return);

        let argc = to_word(argc, open)?;
        let len = to_word(self.code.len() - start, open)?;
        self.code.write_word_at(start + 1, argc)?;
        self.code.write_word_at(start + 3, len)
    }

    /// `(op arg ...)` for one of the built-in operators.
    fn operator(&mut self, scanner: &mut Scanner<'_>, open: Token, op: Operator) -> Result<()> {
        let argc = self.arguments(scanner, open)?;
        self.code.write_op(op.opcode());
        self.code.write_word(argc);
        Ok(())
    }

    /// `(callee arg ...)`
    fn call(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
        let callee = scanner.next();
        match callee.kind {
            TokenKind::LParen => self.nested(scanner, callee)?,
            TokenKind::Atom => match classify(callee, scanner.text(callee))? {
                Atom::Symbol(name) => self.lookup(callee, name)?,
                _ => return Err(error_at(callee, "expected a function")),
            },
            _ => return Err(error_at(callee, "expected a function")),
        }
        let argc = self.arguments(scanner, open)?;
        self.code.write_op(OpCode::CallFunction);
        self.code.write_word(argc);
        Ok(())
    }

    /// Compiles expressions up to and including the closing `)`.
    fn arguments(&mut self, scanner: &mut Scanner<'_>, open: Token) -> Result<Word> {
        let mut argc: usize = 0;
        loop {
            let token = scanner.peek();
            match token.kind {
                TokenKind::RParen => {
                    scanner.next();
                    return to_word(argc, open);
                }
                TokenKind::End => return Err(error_at(open, "unterminated list")),
                _ => {}
            }
            self.expression(scanner)?;
            argc += 1;
        }
    }

    /// Compiles one required argument.
    fn argument(&mut self, scanner: &mut Scanner<'_>, open: Token, message: &str) -> Result<()> {
        match scanner.peek().kind {
            TokenKind::RParen => Err(error_at(open, message)),
            TokenKind::End => Err(error_at(open, "unterminated list")),
            _ => self.expression(scanner),
        }
    }

    /// Compiles exactly one body expression and the closing `)`.
    fn body(&mut self, scanner: &mut Scanner<'_>, open: Token, form: &str) -> Result<()> {
        self.argument(scanner, open, &format!("{form} requires a body"))?;
        let close = scanner.peek();
        if close.kind == TokenKind::RParen || close.kind == TokenKind::End {
            return expect_close(scanner, open);
        }
        Err(error_at(close, format!("{form} takes exactly one body expression")))
    }

    /// Compiles `key value` and emits `SET_SYMBOL`.
    fn binding(&mut self, scanner: &mut Scanner<'_>, open: Token, form: &str) -> Result<()> {
        let key = scanner.next();
        let name = match key.kind {
            TokenKind::Atom => match classify(key, scanner.text(key))? {
                Atom::Symbol(name) => name,
                _ => return Err(error_at(key, format!("{form} keys must be symbols"))),
            },
            _ => return Err(error_at(key, format!("{form} keys must be symbols"))),
        };
        self.code.write_op(OpCode::PushSymbol);
        self.chars(key, name)?;
        self.argument(scanner, open, &format!("{form} binding for '{name}' has no value"))?;
        self.code.write_op(OpCode::SetSymbol);
        Ok(())
    }

    fn lookup(&mut self, token: Token, name: &str) -> Result<()> {
        self.code.write_op(OpCode::PushSymbol);
        self.chars(token, name)?;
        self.code.write_op(OpCode::GetSymbol);
        Ok(())
    }

    fn string(&mut self, scanner: &Scanner<'_>, token: Token) -> Result<()> {
        let text = unescape(token, scanner.text(token))?;
        self.code.write_op(OpCode::PushString);
        self.chars(token, &text)
    }

    fn chars(&mut self, token: Token, text: &str) -> Result<()> {
        if text.contains('\0') {
            return Err(error_at(token, "NUL byte not allowed"));
        }
        self.code.write_chars(text);
        Ok(())
    }

    /// Emits a jump with a placeholder target and returns the target's
    /// offset.
    fn jump(&mut self, op: OpCode) -> usize {
        self.code.write_op(op);
        let at = self.code.len();
        self.code.write_word(0);
        at
    }

    /// Points the jump target at `at` to the current end of code.
    fn patch_jump(&mut self, at: usize, open: Token) -> Result<()> {
        let target = to_word(self.code.len(), open)?;
        self.code.write_word_at(at, target)
    }
}

fn expect_close(scanner: &mut Scanner<'_>, open: Token) -> Result<()> {
    let token = scanner.next();
    match token.kind {
        TokenKind::RParen => Ok(()),
        TokenKind::End => Err(error_at(open, "unterminated list")),
        _ => Err(error_at(token, "expected ')'")),
    }
}

fn to_word(n: usize, at: Token) -> Result<Word> {
    Word::try_from(n).map_err(|_| error_at(at, format!("code exceeds {} bytes", Word::MAX)))
}

fn error_at(token: Token, message: impl Into<String>) -> Error {
    token.span.compile_error(message)
}

/// Classifies an atom. Tokens that start like numbers must be numbers.
fn classify(token: Token, text: &str) -> Result<Atom<'_>> {
    match text {
        "nil" => return Ok(Atom::Nil),
        "true" => return Ok(Atom::True),
        "false" => return Ok(Atom::False),
        _ => {}
    }

    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(Atom::Symbol(text));
    }

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let valid = all_digits(whole) && fraction.is_none_or(|f| !f.is_empty() && all_digits(f));
    if !valid {
        return Err(error_at(token, format!("malformed number '{text}'")));
    }
    text.parse::<Number>()
        .map(Atom::Number)
        .map_err(|_| error_at(token, format!("malformed number '{text}'")))
}

/// Strips the quotes from a string token and resolves escapes.
fn unescape(token: Token, quoted: &str) -> Result<String> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let resolved = match chars.next() {
            Some('a') => '\u{07}',
            Some('b') => '\u{08}',
            Some('e') => '\u{1b}',
            Some('f') => '\u{0c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some('?') => '?',
            Some(other) => return Err(error_at(token, format!("unknown escape '\\{other}'"))),
            None => return Err(error_at(token, "unterminated escape")),
        };
        out.push(resolved);
    }
    Ok(out)
}
