//! Session state for the REPL and CLI.
//!
//! A session owns one bytecode buffer that grows with every accepted input
//! and one core environment that persists across inputs. Closures compiled
//! by earlier inputs keep pointing into the same buffer, so they stay
//! callable for the life of the session.
//!
//! Jump targets and function lengths are absolute `u16` offsets, so once the
//! buffer passes 65535 bytes any new `if` or `fn` fails to compile. Plain
//! expressions and calls keep working. Start a new session to reclaim space.

use std::fs;
use std::path::Path;

use bytelisp_foundation::{EnvRef, Error, ErrorKind, Result, Value};
use bytelisp_language::{Code, Compiler, Vm, VmConfig, Word, disassemble_instruction};
use bytelisp_stdlib::make_core;

/// Persistent compile-and-run state.
pub struct Session {
    /// Every accepted input, compiled back to back.
    code: Code,
    /// Core environment; top-level `def`s land here.
    env: EnvRef,
    /// The VM that runs each new chunk of code.
    vm: Vm,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session over a fresh core environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Creates a session whose VM uses `config`.
    #[must_use]
    pub fn with_config(config: VmConfig) -> Self {
        Self {
            code: Code::new(),
            env: make_core(),
            vm: Vm::with_config(config),
        }
    }

    /// All code compiled so far.
    #[must_use]
    pub const fn code(&self) -> &Code {
        &self.code
    }

    /// The persistent core environment.
    #[must_use]
    pub const fn env(&self) -> &EnvRef {
        &self.env
    }

    /// The session's VM (for trace inspection).
    #[must_use]
    pub const fn vm(&self) -> &Vm {
        &self.vm
    }

    /// Bytes left before new jumps and functions can no longer be encoded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        usize::from(Word::MAX).saturating_sub(self.code.len())
    }

    /// Looks a name up in the core environment.
    #[must_use]
    pub fn get(&self, name: &str) -> Value {
        self.env.borrow().get(name)
    }

    /// Names bound in the core environment, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.env
            .borrow()
            .names()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Compiles `source` onto the end of the buffer and returns the offset
    /// where the new code starts. On error the buffer is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first scan or compile error.
    pub fn compile(&mut self, source: &str) -> Result<usize> {
        let start = self.code.len();
        Compiler::new(&mut self.code).compile(source)?;
        Ok(start)
    }

    /// Runs the code from `start` to the end of the buffer and returns the
    /// value of the last expression. The value stack is cleared afterwards,
    /// whether or not the run succeeded; definitions made before a runtime
    /// error are kept.
    ///
    /// # Errors
    ///
    /// Returns the first runtime error.
    pub fn run_from(&mut self, start: usize) -> Result<Value> {
        let result = self.vm.run_from(&self.code, start, EnvRef::clone(&self.env));
        self.vm.clear_stack();
        result
    }

    /// Compiles and runs `source`.
    ///
    /// # Errors
    ///
    /// Returns the first compile or runtime error.
    pub fn eval(&mut self, source: &str) -> Result<Value> {
        let start = self.compile(source)?;
        self.run_from(start)
    }

    /// Reads and evaluates a source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or evaluated.
    pub fn eval_file(&mut self, path: &Path) -> Result<Value> {
        let source = read_source(path)?;
        self.eval(&source)
    }

    /// Compiles a source file without running it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or compiled.
    pub fn compile_file(&mut self, path: &Path) -> Result<usize> {
        let source = read_source(path)?;
        self.compile(&source)
    }

    /// Installs a loaded image as the session's code and runs it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session already holds code, or a runtime
    /// error from the image.
    pub fn load_image(&mut self, code: Code) -> Result<Value> {
        if !self.code.is_empty() {
            return Err(Error::new(ErrorKind::Internal(
                "images can only be loaded into an empty session".to_string(),
            )));
        }
        self.code = code;
        self.run_from(0)
    }

    /// Disassembles the code from `start` to the end of the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the code does not decode.
    pub fn listing(&self, start: usize) -> Result<String> {
        let mut out = String::new();
        let mut offset = start;
        while offset < self.code.len() {
            let (line, next) = disassemble_instruction(&self.code, offset)?;
            out.push_str(&line);
            out.push('\n');
            offset = next;
        }
        Ok(out)
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to read {}: {e}",
            path.display()
        )))
    })
}
