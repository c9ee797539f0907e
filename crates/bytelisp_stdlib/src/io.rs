//! Output natives.

use std::io::{self, Write};

use bytelisp_foundation::{Error, Result, Type, Value};

/// `(print arg ...)`: writes numbers and strings in argument order.
pub(crate) fn print(stack: &mut Vec<Value>) -> Result<()> {
    write_values(&mut io::stdout().lock(), stack, false)?;
    stack.push(Value::Nil);
    Ok(())
}

/// `(println arg ...)`: like `print`, then a newline.
pub(crate) fn println(stack: &mut Vec<Value>) -> Result<()> {
    write_values(&mut io::stdout().lock(), stack, true)?;
    stack.push(Value::Nil);
    Ok(())
}

/// Writes numbers and strings back to back, optionally followed by a
/// newline. Nothing is written unless every value is printable.
///
/// # Errors
///
/// Returns a type mismatch for any value that is not a number or string,
/// or an I/O error from `out`.
pub fn write_values(out: &mut impl Write, values: &[Value], newline: bool) -> Result<()> {
    if let Some(bad) = values
        .iter()
        .find(|v| !matches!(v, Value::Number(_) | Value::String(_)))
    {
        return Err(Error::type_mismatch(Type::String, bad.value_type()));
    }
    for value in values {
        write!(out, "{value}")?;
    }
    if newline {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
