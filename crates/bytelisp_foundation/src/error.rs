//! Error types for the Bytelisp system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every error is fatal to the compile-then-run cycle that produced it.

use std::fmt;

use thiserror::Error;

use crate::types::Type;

/// The main error type for Bytelisp operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a scanner error at the given position.
    #[must_use]
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::Parse {
            message: message.into(),
            line,
            column,
        })
    }

    /// Creates a compiler error at the given position.
    #[must_use]
    pub fn compile(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::Compile {
            message: message.into(),
            line,
            column,
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(expected: impl Into<String>, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            expected: expected.into(),
            actual,
        })
    }

    /// Creates a malformed bytecode error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedBytecode(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The scanner could not split the source into tokens.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        /// Description of the problem.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// The compiler rejected the token stream.
    #[error("compile error at {line}:{column}: {message}")]
    Compile {
        /// Description of the problem.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// A recognized form that has no implementation.
    #[error("\"{0}\" not yet implemented")]
    NotImplemented(String),

    /// Type mismatch during runtime type checking.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Wrong number of arguments to a function or operator.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Description of expected arity.
        expected: String,
        /// Actual number of arguments.
        actual: usize,
    },

    /// Attempted to call a value that is not a function.
    #[error("expected function, got {0}")]
    NotCallable(Type),

    /// A native function left nothing on its argument stack.
    #[error("native function {0} returned no value: expected 1+ return values")]
    EmptyNativeResult(String),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// The value stack grew past its configured limit.
    #[error("stack overflow: more than {0} values")]
    StackOverflow(usize),

    /// Bytecode could not be decoded.
    #[error("malformed bytecode: {0}")]
    MalformedBytecode(String),

    /// Serialization or deserialization of a bytecode image failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file name.
    pub source: Option<String>,
    /// Bytecode offset of the failing instruction.
    pub offset: Option<usize>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the bytecode offset.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, self.offset) {
            (Some(source), Some(offset)) => write!(f, "in {source} at offset {offset:04}"),
            (Some(source), None) => write!(f, "in {source}"),
            (None, Some(offset)) => write!(f, "at offset {offset:04}"),
            (None, None) => Ok(()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(e.to_string()))
    }
}
