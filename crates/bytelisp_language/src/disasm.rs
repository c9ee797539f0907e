//! Human-readable bytecode listings.
//!
//! One line per instruction: `offset  OPCODE  operands`. Used by the CLI's
//! `--disassemble` flag and by the VM tracer.

use std::fmt::Write;

use bytelisp_foundation::Result;

use crate::code::{Code, OpCode};

/// Renders the whole buffer, one instruction per line.
///
/// # Errors
///
/// Returns an error if the buffer does not decode.
pub fn disassemble(code: &Code) -> Result<String> {
    let mut out = String::new();
    let mut offset = 0;
    while offset < code.len() {
        let (line, next) = disassemble_instruction(code, offset)?;
        out.push_str(&line);
        out.push('\n');
        offset = next;
    }
    Ok(out)
}

/// Renders the instruction at `offset` and returns the offset of the next
/// one.
///
/// Function bodies are listed inline: `MAKE_FUNCTION` reports where its body
/// ends but the returned offset points at the first body instruction.
///
/// # Errors
///
/// Returns an error if the instruction does not decode.
pub fn disassemble_instruction(code: &Code, offset: usize) -> Result<(String, usize)> {
    let mut ip = offset;
    let op = code.read_op(&mut ip)?;
    let mut line = format!("{offset:04}  {:<14}", op.name());

    // Writing to a String cannot fail.
    match op {
        OpCode::PushSymbol | OpCode::PushString => {
            let text = code.read_chars(&mut ip)?;
            if op == OpCode::PushString {
                let _ = write!(line, "{text:?}");
            } else {
                line.push_str(text);
            }
        }
        OpCode::PushNumber => {
            let n = code.read_number(&mut ip)?;
            let _ = write!(line, "{n}");
        }
        OpCode::MakeFunction => {
            let start = offset;
            let argc = code.read_word(&mut ip)?;
            let len = code.read_word(&mut ip)?;
            let _ = write!(line, "argc={argc} end={:04} (", start + usize::from(len));
            for i in 0..argc {
                if i > 0 {
                    line.push(' ');
                }
                line.push_str(code.read_chars(&mut ip)?);
            }
            line.push(')');
        }
        OpCode::Jump | OpCode::JumpIfFalse => {
            let target = code.read_word(&mut ip)?;
            let _ = write!(line, "-> {target:04}");
        }
        OpCode::CallFunction
        | OpCode::Eq
        | OpCode::Less
        | OpCode::LessEq
        | OpCode::Greater
        | OpCode::GreaterEq
        | OpCode::Add
        | OpCode::Sub
        | OpCode::Mul
        | OpCode::Div => {
            let argc = code.read_word(&mut ip)?;
            let _ = write!(line, "{argc}");
        }
        OpCode::Return
        | OpCode::Pop
        | OpCode::PushNil
        | OpCode::PushTrue
        | OpCode::PushFalse
        | OpCode::SetSymbol
        | OpCode::GetSymbol
        | OpCode::NewEnv => {}
    }

    Ok((line.trim_end().to_string(), ip))
}
