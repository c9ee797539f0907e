//! Stack-based virtual machine for Bytelisp bytecode.
//!
//! The VM keeps one value stack, an instruction pointer, and the current
//! environment. Scopes are entered by pushing a [`FrameState`] holding the
//! environment to restore; `RETURN` pops the result and the frame below it.
//! Frames for block scopes carry no resume offset.
//!
//! Environments are shared with closures, so leaving a scope only drops the
//! VM's own reference to it.

#![allow(clippy::needless_pass_by_value)]

mod config;
mod native;

pub use config::{DEFAULT_MAX_STACK, TraceOutput, VmConfig};
pub use native::{Operator, apply_operator};

use std::mem;
use std::rc::Rc;

use bytelisp_foundation::{
    Closure, EnvRef, Environment, Error, ErrorContext, ErrorKind, FrameState, Result, Symbol,
    Type, Value,
};

use crate::code::{Code, OpCode};
use crate::disasm::disassemble_instruction;

/// Stack-based virtual machine.
pub struct Vm {
    /// Operand stack, with frames interleaved.
    stack: Vec<Value>,
    /// Instruction pointer.
    ip: usize,
    /// Current environment.
    env: EnvRef,
    /// Limits and tracing.
    config: VmConfig,
    /// Traced lines when tracing to [`TraceOutput::Buffer`].
    trace: Vec<String>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Creates a new VM.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Creates a new VM with the given configuration.
    #[must_use]
    pub fn with_config(config: VmConfig) -> Self {
        Self {
            stack: Vec::with_capacity(256),
            ip: 0,
            env: Environment::root(),
            config,
            trace: Vec::new(),
        }
    }

    /// Resets the VM state.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.ip = 0;
        self.env = Environment::root();
        self.trace.clear();
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Returns the value stack, bottom first.
    #[must_use]
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Returns the top of the stack.
    #[must_use]
    pub fn top(&self) -> Option<&Value> {
        self.stack.last()
    }

    /// Pops the top of the stack.
    pub fn take_result(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    /// Discards every value on the stack.
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// Returns the current environment.
    #[must_use]
    pub fn env(&self) -> &EnvRef {
        &self.env
    }

    /// Returns lines traced to [`TraceOutput::Buffer`].
    #[must_use]
    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Executes `code` from the start in `env` and returns the top of the
    /// stack (nil if the program pushed nothing).
    ///
    /// # Errors
    ///
    /// Returns the first runtime error. The stack is left as it was at the
    /// failing instruction.
    pub fn run(&mut self, code: &Code, env: EnvRef) -> Result<Value> {
        self.run_from(code, 0, env)
    }

    /// Executes `code` starting at `start`. Used by sessions that append to
    /// one buffer and run only the newly compiled tail.
    ///
    /// # Errors
    ///
    /// Returns the first runtime error.
    pub fn run_from(&mut self, code: &Code, start: usize, env: EnvRef) -> Result<Value> {
        self.ip = start;
        self.env = env;

        while self.ip < code.len() {
            let offset = self.ip;
            let listing = if self.config.is_tracing() {
                Some(disassemble_instruction(code, offset)?.0)
            } else {
                None
            };

            let op = code.read_op(&mut self.ip)?;
            self.step(code, offset, op).map_err(|e| {
                if e.context.is_some() {
                    e
                } else {
                    e.with_context(ErrorContext::new().with_offset(offset))
                }
            })?;

            if let Some(listing) = listing {
                self.emit_trace(listing);
            }
        }

        Ok(self.top().cloned().unwrap_or(Value::Nil))
    }

    /// Executes one decoded instruction.
    fn step(&mut self, code: &Code, offset: usize, op: OpCode) -> Result<()> {
        match op {
            OpCode::Return => {
                let result = self.pop()?;
                let Value::Frame(frame) = self.pop()? else {
                    return Err(Error::internal("return without a frame"));
                };
                self.env = frame.env;
                self.push(result)?;
                if let Some(ret) = frame.ret {
                    self.ip = ret;
                }
            }

            OpCode::Pop => {
                self.pop()?;
            }
            OpCode::PushNil => self.push(Value::Nil)?,
            OpCode::PushTrue => self.push(Value::Bool(true))?,
            OpCode::PushFalse => self.push(Value::Bool(false))?,
            OpCode::PushSymbol => {
                let name = code.read_chars(&mut self.ip)?;
                self.push(Value::symbol(name))?;
            }
            OpCode::PushNumber => {
                let n = code.read_number(&mut self.ip)?;
                self.push(Value::Number(n))?;
            }
            OpCode::PushString => {
                let text = code.read_chars(&mut self.ip)?;
                self.push(Value::string(text))?;
            }

            OpCode::SetSymbol => {
                let value = self.pop()?;
                let key = self.pop_symbol()?;
                self.env.borrow_mut().set(key, value.clone());
                self.push(value)?;
            }
            OpCode::GetSymbol => {
                let key = self.pop_symbol()?;
                let value = self.env.borrow().get(key.as_str());
                self.push(value)?;
            }

            OpCode::MakeFunction => {
                let argc = code.read_word(&mut self.ip)?;
                let len = code.read_word(&mut self.ip)?;
                let params = (0..argc)
                    .map(|_| code.read_chars(&mut self.ip).map(Symbol::new))
                    .collect::<Result<Vec<_>>>()?;
                let end = offset + usize::from(len);
                if end < self.ip {
                    return Err(Error::malformed(format!("function at {offset:04} ends in its header")));
                }
                let closure = Closure {
                    env: Rc::clone(&self.env),
                    params,
                    body: self.ip,
                };
                self.push(Value::Closure(Rc::new(closure)))?;
                self.ip = end;
            }
            OpCode::CallFunction => {
                let argc = code.read_word(&mut self.ip)?;
                let args = self.pop_n(usize::from(argc))?;
                let callee = self.pop()?;
                self.call(callee, args)?;
            }
            OpCode::NewEnv => {
                let inner = Environment::child(&self.env);
                let outer = mem::replace(&mut self.env, inner);
                self.push(Value::Frame(FrameState {
                    env: outer,
                    ret: None,
                }))?;
            }

            OpCode::Jump => {
                let target = code.read_word(&mut self.ip)?;
                self.ip = usize::from(target);
            }
            OpCode::JumpIfFalse => {
                let target = code.read_word(&mut self.ip)?;
                match self.pop()? {
                    Value::Bool(false) => self.ip = usize::from(target),
                    Value::Bool(true) => {}
                    other => return Err(Error::type_mismatch(Type::Bool, other.value_type())),
                }
            }

            OpCode::Eq
            | OpCode::Less
            | OpCode::LessEq
            | OpCode::Greater
            | OpCode::GreaterEq
            | OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Div => {
                let argc = code.read_word(&mut self.ip)?;
                let operator = Operator::from_opcode(op)
                    .ok_or_else(|| Error::internal(format!("{} is not an operator", op.name())))?;
                let args = self.pop_n(usize::from(argc))?;
                let result = apply_operator(operator, &args)?;
                self.push(result)?;
            }
        }
        Ok(())
    }

    /// Calls a native or closure with arguments in call order.
    fn call(&mut self, callee: Value, mut args: Vec<Value>) -> Result<()> {
        match callee {
            Value::Native(native) => {
                (native.func)(&mut args)?;
                let result = args
                    .pop()
                    .ok_or_else(|| Error::new(ErrorKind::EmptyNativeResult(native.name.to_string())))?;
                self.push(result)
            }
            Value::Closure(closure) => {
                if args.len() != closure.arity() {
                    return Err(Error::arity_mismatch(closure.arity().to_string(), args.len()));
                }
                let inner = Environment::child(&closure.env);
                {
                    let mut scope = inner.borrow_mut();
                    for (param, arg) in closure.params.iter().zip(args) {
                        scope.set(param.clone(), arg);
                    }
                }
                let caller = mem::replace(&mut self.env, inner);
                self.push(Value::Frame(FrameState {
                    env: caller,
                    ret: Some(self.ip),
                }))?;
                self.ip = closure.body;
                Ok(())
            }
            other => Err(Error::new(ErrorKind::NotCallable(other.value_type()))),
        }
    }

    fn emit_trace(&mut self, listing: String) {
        let stack = self
            .stack
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let line = format!("{listing:<40} [ {stack} ]");
        match self.config.trace {
            TraceOutput::None => {}
            TraceOutput::Stderr => eprintln!("{line}"),
            TraceOutput::Buffer => self.trace.push(line),
        }
    }

    // Stack operations

    fn push(&mut self, value: Value) -> Result<()> {
        if self.stack.len() >= self.config.max_stack {
            return Err(Error::new(ErrorKind::StackOverflow(self.config.max_stack)));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        self.stack
            .pop()
            .ok_or_else(|| Error::internal("stack underflow"))
    }

    /// Pops `n` values, returned bottom first.
    fn pop_n(&mut self, n: usize) -> Result<Vec<Value>> {
        let len = self.stack.len();
        if n > len {
            return Err(Error::internal("stack underflow"));
        }
        Ok(self.stack.split_off(len - n))
    }

    fn pop_symbol(&mut self) -> Result<Symbol> {
        match self.pop()? {
            Value::Symbol(symbol) => Ok(symbol),
            other => Err(Error::type_mismatch(Type::Symbol, other.value_type())),
        }
    }
}

/// Compiles and runs `source` in a fresh root environment with no natives
/// bound, returning the value of the last top-level expression.
///
/// # Errors
///
/// Returns the first compile or runtime error.
pub fn eval(source: &str) -> Result<Value> {
    let code = crate::compiler::compile(source)?;
    let mut vm = Vm::new();
    vm.run(&code, Environment::root())
}
