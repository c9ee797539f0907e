//! Operators as native functions.

use bytelisp_foundation::{Result, Value};
use bytelisp_language::{Operator, apply_operator};

macro_rules! operator_natives {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            pub(crate) fn $name(stack: &mut Vec<Value>) -> Result<()> {
                let result = apply_operator(Operator::$op, stack)?;
                stack.push(result);
                Ok(())
            }
        )*
    };
}

operator_natives! {
    eq => Eq,
    less => Less,
    less_eq => LessEq,
    greater => Greater,
    greater_eq => GreaterEq,
    add => Add,
    sub => Sub,
    mul => Mul,
    div => Div,
}
