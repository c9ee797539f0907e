//! Bytecode instruction set and buffer for the Bytelisp VM.
//!
//! Code is a flat byte buffer. Each instruction is a one-byte [`OpCode`]
//! followed by its inline operands:
//!
//! - words are `u16`, little-endian
//! - numbers are `f32`, little-endian
//! - chars are UTF-8 bytes followed by a zero terminator
//!
//! Jump targets and function lengths are words, so a single buffer is
//! limited to [`Word::MAX`] bytes.

#![allow(clippy::doc_markdown)]

use bytelisp_foundation::{Error, Number, Result};

/// Fixed-width operand used for counts, lengths, and jump targets.
pub type Word = u16;

/// Initial buffer capacity in bytes. The buffer doubles when full.
const INITIAL_CAPACITY: usize = 8;

/// A single bytecode opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // === Scopes ===
    /// Pop result and frame, restore the frame's environment, push result,
    /// and resume at the saved offset if there is one.
    Return = 0,

    // === Stack Operations ===
    /// Pop and discard the top of stack.
    Pop,
    /// Push nil.
    PushNil,
    /// Push true.
    PushTrue,
    /// Push false.
    PushFalse,
    /// Push a symbol. Operand: chars.
    PushSymbol,
    /// Push a number. Operand: number.
    PushNumber,
    /// Push a string. Operand: chars.
    PushString,

    // === Variables ===
    /// `[key, value] -> [value]`, binding key in the current environment.
    SetSymbol,
    /// `[key] -> [value]`, looking key up through the environment chain.
    GetSymbol,

    // === Functions ===
    /// Build a closure over the current environment and skip its body.
    /// Operands: argc word, length word, argc parameter chars.
    MakeFunction,
    /// `[callee, arg1 .. argN] -> [result]`. Operand: argc word.
    CallFunction,
    /// Push a block frame and enter a child environment.
    NewEnv,

    // === Control Flow ===
    /// Unconditional jump. Operand: absolute target word.
    Jump,
    /// Pop a boolean and jump when it is false. Operand: absolute target word.
    JumpIfFalse,

    // === Operators (variadic, operand: argc word) ===
    /// Structural equality over all operands.
    Eq,
    /// Chained `<`.
    Less,
    /// Chained `<=`.
    LessEq,
    /// Chained `>`.
    Greater,
    /// Chained `>=`.
    GreaterEq,
    /// Sum.
    Add,
    /// Difference, or negation with one operand.
    Sub,
    /// Product.
    Mul,
    /// Quotient, or reciprocal with one operand.
    Div,
}

impl OpCode {
    /// All opcodes in encoding order.
    pub const ALL: [Self; 24] = [
        Self::Return,
        Self::Pop,
        Self::PushNil,
        Self::PushTrue,
        Self::PushFalse,
        Self::PushSymbol,
        Self::PushNumber,
        Self::PushString,
        Self::SetSymbol,
        Self::GetSymbol,
        Self::MakeFunction,
        Self::CallFunction,
        Self::NewEnv,
        Self::Jump,
        Self::JumpIfFalse,
        Self::Eq,
        Self::Less,
        Self::LessEq,
        Self::Greater,
        Self::GreaterEq,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
    ];

    /// Mnemonic used by the disassembler.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Return => "RETURN",
            Self::Pop => "POP",
            Self::PushNil => "PUSH_NIL",
            Self::PushTrue => "PUSH_TRUE",
            Self::PushFalse => "PUSH_FALSE",
            Self::PushSymbol => "PUSH_SYMBOL",
            Self::PushNumber => "PUSH_NUMBER",
            Self::PushString => "PUSH_STRING",
            Self::SetSymbol => "SET_SYMBOL",
            Self::GetSymbol => "GET_SYMBOL",
            Self::MakeFunction => "MAKE_FUNCTION",
            Self::CallFunction => "CALL_FUNCTION",
            Self::NewEnv => "NEW_ENV",
            Self::Jump => "JUMP",
            Self::JumpIfFalse => "JUMP_IF_FALSE",
            Self::Eq => "EQ",
            Self::Less => "LESS",
            Self::LessEq => "LESS_EQ",
            Self::Greater => "GREATER",
            Self::GreaterEq => "GREATER_EQ",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(byte))
            .copied()
            .ok_or_else(|| Error::malformed(format!("unknown opcode {byte:#04x}")))
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as Self
    }
}

/// Growable bytecode buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Code {
    bytes: Vec<u8>,
}

impl Default for Code {
    fn default() -> Self {
        Self::new()
    }
}

impl Code {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Wraps existing bytes, e.g. from a loaded image.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Allocated size in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Discards everything past `len`.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Appends one byte, doubling the allocation when full.
    pub fn write(&mut self, byte: u8) {
        if self.bytes.len() == self.bytes.capacity() {
            let additional = self.bytes.capacity().max(INITIAL_CAPACITY);
            self.bytes.reserve_exact(additional);
        }
        self.bytes.push(byte);
    }

    /// Appends an opcode.
    pub fn write_op(&mut self, op: OpCode) {
        self.write(op.into());
    }

    /// Appends a little-endian word.
    pub fn write_word(&mut self, word: Word) {
        for byte in word.to_le_bytes() {
            self.write(byte);
        }
    }

    /// Appends a little-endian number.
    pub fn write_number(&mut self, number: Number) {
        for byte in number.to_le_bytes() {
            self.write(byte);
        }
    }

    /// Appends text followed by a zero terminator.
    pub fn write_chars(&mut self, text: &str) {
        for &byte in text.as_bytes() {
            self.write(byte);
        }
        self.write(0);
    }

    /// Overwrites the byte at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` has not been written.
    pub fn write_at(&mut self, offset: usize, byte: u8) -> Result<()> {
        let slot = self
            .bytes
            .get_mut(offset)
            .ok_or_else(|| Error::malformed(format!("patch past end at {offset:04}")))?;
        *slot = byte;
        Ok(())
    }

    /// Overwrites the word at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the word has not been written.
    pub fn write_word_at(&mut self, offset: usize, word: Word) -> Result<()> {
        let [lo, hi] = word.to_le_bytes();
        self.write_at(offset + 1, hi)?;
        self.write_at(offset, lo)
    }

    /// Reads one byte and advances the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error at end of code.
    pub fn read(&self, offset: &mut usize) -> Result<u8> {
        let byte = self
            .bytes
            .get(*offset)
            .copied()
            .ok_or_else(|| Error::malformed(format!("read past end at {:04}", *offset)))?;
        *offset += 1;
        Ok(byte)
    }

    /// Reads an opcode and advances the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error at end of code or for an unknown opcode byte.
    pub fn read_op(&self, offset: &mut usize) -> Result<OpCode> {
        OpCode::try_from(self.read(offset)?)
    }

    /// Reads a word and advances the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two bytes remain.
    pub fn read_word(&self, offset: &mut usize) -> Result<Word> {
        let bytes = self.read_array::<2>(offset)?;
        Ok(Word::from_le_bytes(bytes))
    }

    /// Reads a number and advances the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than four bytes remain.
    pub fn read_number(&self, offset: &mut usize) -> Result<Number> {
        let bytes = self.read_array::<4>(offset)?;
        Ok(Number::from_le_bytes(bytes))
    }

    /// Reads zero-terminated text and advances the cursor past the
    /// terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if no terminator follows or the text is not UTF-8.
    pub fn read_chars(&self, offset: &mut usize) -> Result<&str> {
        let start = *offset;
        let rest = self
            .bytes
            .get(start..)
            .ok_or_else(|| Error::malformed(format!("read past end at {start:04}")))?;
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::malformed(format!("unterminated chars at {start:04}")))?;
        let text = std::str::from_utf8(&rest[..len])
            .map_err(|e| Error::malformed(format!("invalid chars at {start:04}: {e}")))?;
        *offset = start + len + 1;
        Ok(text)
    }

    fn read_array<const N: usize>(&self, offset: &mut usize) -> Result<[u8; N]> {
        let start = *offset;
        let bytes = self
            .bytes
            .get(start..start + N)
            .and_then(|slice| <[u8; N]>::try_from(slice).ok())
            .ok_or_else(|| Error::malformed(format!("read past end at {start:04}")))?;
        *offset = start + N;
        Ok(bytes)
    }
}
