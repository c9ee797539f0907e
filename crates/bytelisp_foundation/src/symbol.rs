//! Shared text with a precomputed hash.
//!
//! Symbols and strings share this representation; only the [`Value`] tag
//! differs. The FNV-1a hash is computed once on construction and lets
//! symbol comparisons reject mismatches without touching the text.
//! `HashMap` lookups still hash the text through `str`'s `Hash`, which keeps
//! `Borrow<str>` lookups by plain `&str` working.
//!
//! [`Value`]: crate::Value

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a hash of a byte string.
#[must_use]
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Immutable, cheaply cloneable text plus its hash.
#[derive(Clone)]
pub struct Symbol {
    text: Rc<str>,
    hash: u32,
}

impl Symbol {
    /// Creates a symbol, copying the text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            hash: fnv1a(text.as_bytes()),
            text: Rc::from(text),
        }
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the precomputed FNV-1a hash.
    #[must_use]
    pub const fn hash_code(&self) -> u32 {
        self.hash
    }

    /// Returns the length of the text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns true if the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.text == other.text
    }
}

impl Eq for Symbol {}

// Must agree with `str`'s Hash so that `Borrow<str>` lookups work.
impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.text
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Symbol {
    fn from(text: String) -> Self {
        Self {
            hash: fnv1a(text.as_bytes()),
            text: Rc::from(text),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_known_values() {
        assert_eq!(fnv1a(b""), 2_166_136_261);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    }

    #[test]
    fn equal_text_equal_hash() {
        let a = Symbol::new("fib");
        let b = Symbol::from(String::from("fib"));
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_ne!(a, Symbol::new("fob"));
    }

    #[test]
    fn borrow_lookup() {
        let mut map = std::collections::HashMap::new();
        map.insert(Symbol::new("x"), 1);
        assert_eq!(map.get("x"), Some(&1));
    }

    #[test]
    fn hash_agrees_with_str() {
        use std::collections::hash_map::DefaultHasher;

        let mut by_symbol = DefaultHasher::new();
        Symbol::new("lookup").hash(&mut by_symbol);
        let mut by_str = DefaultHasher::new();
        "lookup".hash(&mut by_str);
        assert_eq!(by_symbol.finish(), by_str.finish());
    }
}
