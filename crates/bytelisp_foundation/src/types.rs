//! Value type tags.

use std::fmt;

/// Type tag of a runtime value.
///
/// Used for type checking in the VM and in error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// The nil type (only value: nil).
    Nil,
    /// Boolean type (`true` or `false`).
    Bool,
    /// Symbol type.
    Symbol,
    /// Single-precision number.
    Number,
    /// String type.
    String,
    /// Native (Rust) function.
    Native,
    /// Closure compiled to bytecode.
    Fn,
    /// Saved environment and return offset (call protocol only).
    Frame,
}

impl Type {
    /// Returns true for the two callable types.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Native | Self::Fn)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Symbol => "symbol",
            Self::Number => "number",
            Self::String => "string",
            Self::Native => "native fn",
            Self::Fn => "fn",
            Self::Frame => "frame",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_display() {
        assert_eq!(Type::Number.to_string(), "number");
        assert_eq!(Type::Native.to_string(), "native fn");
        assert_eq!(Type::Frame.to_string(), "frame");
    }

    #[test]
    fn callable_types() {
        assert!(Type::Fn.is_callable());
        assert!(Type::Native.is_callable());
        assert!(!Type::Symbol.is_callable());
    }
}
