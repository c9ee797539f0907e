//! Core value type for all Bytelisp data.

use std::fmt;
use std::rc::Rc;

use crate::env::EnvRef;
use crate::symbol::Symbol;
use crate::types::Type;

/// Numbers are single-precision floats.
pub type Number = f32;

/// Signature of a native function.
///
/// The function receives the argument stack (first argument at the bottom,
/// last argument on top) and must leave its result on top of that stack.
pub type NativeFnPtr = fn(&mut Vec<Value>) -> crate::Result<()>;

/// Core value type for all Bytelisp data.
///
/// Values are cheaply cloneable: text, closures, and environments are shared
/// through reference counting.
#[derive(Clone)]
pub enum Value {
    /// The nil value (represents absence).
    Nil,
    /// `true` or `false`.
    Bool(bool),
    /// Symbol (identifier).
    Symbol(Symbol),
    /// Single-precision number.
    Number(Number),
    /// String value.
    String(Symbol),
    /// Native function implemented in Rust.
    Native(NativeFn),
    /// Function compiled to bytecode, with its defining environment.
    Closure(Rc<Closure>),
    /// Saved scope state pushed by the call protocol.
    Frame(FrameState),
}

/// Native function callable from Bytelisp.
#[derive(Clone, Copy)]
pub struct NativeFn {
    /// Function name for debugging.
    pub name: &'static str,
    /// Function pointer.
    pub func: NativeFnPtr,
}

impl NativeFn {
    /// Creates a named native function.
    #[must_use]
    pub const fn new(name: &'static str, func: NativeFnPtr) -> Self {
        Self { name, func }
    }
}

/// A function value paired with the environment active at its definition.
pub struct Closure {
    /// Defining environment. Kept alive for as long as the closure is.
    pub env: EnvRef,
    /// Parameter names in declaration order.
    pub params: Vec<Symbol>,
    /// Bytecode offset of the body.
    pub body: usize,
}

impl Closure {
    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Environment and resume offset to restore when a scope returns.
#[derive(Clone)]
pub struct FrameState {
    /// Environment in effect before the scope was entered.
    pub env: EnvRef,
    /// Offset to resume at, or `None` for block scopes that only restore the
    /// environment.
    pub ret: Option<usize>,
}

impl Value {
    /// Returns the type of this value.
    #[must_use]
    pub const fn value_type(&self) -> Type {
        match self {
            Self::Nil => Type::Nil,
            Self::Bool(_) => Type::Bool,
            Self::Symbol(_) => Type::Symbol,
            Self::Number(_) => Type::Number,
            Self::String(_) => Type::String,
            Self::Native(_) => Type::Native,
            Self::Closure(_) => Type::Fn,
            Self::Frame(_) => Type::Frame,
        }
    }

    /// Creates a symbol value.
    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(Symbol::new(name))
    }

    /// Creates a string value.
    #[must_use]
    pub fn string(text: &str) -> Self {
        Self::String(Symbol::new(text))
    }

    /// Returns true if this value is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string's text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to extract a symbol.
    #[must_use]
    pub const fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a closure.
    #[must_use]
    pub const fn as_closure(&self) -> Option<&Rc<Closure>> {
        match self {
            Self::Closure(c) => Some(c),
            _ => None,
        }
    }
}

// Structural equality: nil and booleans by tag, numbers by value, text by
// bytes. Functions compare by identity. Frames never compare equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) | (Self::String(a), Self::String(b)) => a == b,
            (Self::Native(a), Self::Native(b)) => std::ptr::fn_addr_eq(a.func, b.func),
            (Self::Closure(a), Self::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Symbol(s) => write!(f, "Symbol({s})"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Native(func) => write!(f, "{func:?}"),
            Self::Closure(c) => write!(f, "{c:?}"),
            Self::Frame(state) => write!(f, "{state:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Symbol(s) | Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Native(func) => write!(f, "<native fn {}>", func.name),
            Self::Closure(c) => write!(f, "<fn/{} @{:04}>", c.arity(), c.body),
            Self::Frame(_) => write!(f, "<frame>"),
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("env_depth", &self.env.borrow().depth())
            .finish()
    }
}

impl fmt::Debug for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ret {
            Some(ip) => write!(f, "Frame(ret: {ip:04})"),
            None => write!(f, "Frame(block)"),
        }
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Symbol::from(s))
    }
}

impl From<NativeFn> for Value {
    fn from(f: NativeFn) -> Self {
        Self::Native(f)
    }
}
