//! Lexical environments.
//!
//! An environment is a table of symbol bindings plus an optional link to the
//! enclosing environment. Lookups walk the chain outward; writes always land
//! in the receiving environment's own table.
//!
//! Environments are shared through [`EnvRef`]. The VM holds one reference to
//! the current environment and closures hold another to the environment they
//! were defined in, so a scope's bindings live exactly as long as something
//! can still reach them.
//!
//! Teardown is iterative. A chain of closures, each captured by the scope
//! of the next, would otherwise be freed by one nested `drop` per link.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::symbol::Symbol;
use crate::value::{Closure, Value};

/// Shared, mutable handle to an environment.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A single scope in the environment chain.
#[derive(Debug, Default)]
pub struct Environment {
    table: HashMap<Symbol, Value>,
    outer: Option<EnvRef>,
}

impl Environment {
    /// Creates an environment with the given outer link.
    #[must_use]
    pub fn new(outer: Option<EnvRef>) -> EnvRef {
        Rc::new(RefCell::new(Self {
            table: HashMap::new(),
            outer,
        }))
    }

    /// Creates an environment with no outer link.
    #[must_use]
    pub fn root() -> EnvRef {
        Self::new(None)
    }

    /// Creates an environment enclosed by `outer`.
    #[must_use]
    pub fn child(outer: &EnvRef) -> EnvRef {
        Self::new(Some(Rc::clone(outer)))
    }

    /// Binds `key` in this environment's own table, returning the previous
    /// binding if there was one. Outer environments are never touched.
    pub fn set(&mut self, key: Symbol, value: Value) -> Option<Value> {
        self.table.insert(key, value)
    }

    /// Looks `key` up through the chain, returning nil if no environment
    /// binds it.
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        self.lookup(key).unwrap_or(Value::Nil)
    }

    /// Looks `key` up through the chain.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.table.get(key) {
            return Some(value.clone());
        }
        let mut current = self.outer.clone();
        while let Some(env) = current {
            let env = env.borrow();
            if let Some(value) = env.table.get(key) {
                return Some(value.clone());
            }
            current = env.outer.clone();
        }
        None
    }

    /// Looks `key` up in this environment only.
    #[must_use]
    pub fn get_local(&self, key: &str) -> Option<&Value> {
        self.table.get(key)
    }

    /// Returns true if `key` is bound anywhere in the chain.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns the enclosing environment.
    #[must_use]
    pub fn outer(&self) -> Option<&EnvRef> {
        self.outer.as_ref()
    }

    /// Number of environments enclosing this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.outer.clone();
        while let Some(env) = current {
            depth += 1;
            current = env.borrow().outer.clone();
        }
        depth
    }

    /// Number of bindings in this environment's own table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if this environment binds nothing itself.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Names bound in this environment's own table, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<Symbol> {
        let mut names: Vec<Symbol> = self.table.keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach(&mut pending);
        while let Some(env) = pending.pop() {
            // Shared scopes are only decremented here; the last owner frees them.
            if let Ok(cell) = Rc::try_unwrap(env) {
                cell.into_inner().detach(&mut pending);
            }
        }
    }
}

impl Environment {
    /// Empties this scope, queueing every environment it alone keeps alive.
    fn detach(&mut self, pending: &mut Vec<EnvRef>) {
        pending.extend(self.outer.take());
        for (_, value) in self.table.drain() {
            match value {
                Value::Closure(closure) => {
                    if let Ok(Closure { env, .. }) = Rc::try_unwrap(closure) {
                        pending.push(env);
                    }
                }
                Value::Frame(frame) => pending.push(frame.env),
                _ => {}
            }
        }
    }
}
