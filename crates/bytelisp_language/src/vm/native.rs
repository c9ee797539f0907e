//! Operator semantics shared by the VM's operator opcodes and the core
//! library's operator natives.

#![allow(clippy::float_cmp)]

use bytelisp_foundation::{Error, ErrorKind, Number, Result, Type, Value};

use crate::code::OpCode;

/// The nine variadic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl Operator {
    /// All operators.
    pub const ALL: [Self; 9] = [
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

    /// The symbol that names this operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// Looks an operator up by symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// The opcode the compiler emits for this operator.
    #[must_use]
    pub const fn opcode(self) -> OpCode {
        match self {
            Self::Eq => OpCode::Eq,
            Self::Less => OpCode::Less,
            Self::LessEq => OpCode::LessEq,
            Self::Greater => OpCode::Greater,
            Self::GreaterEq => OpCode::GreaterEq,
            Self::Add => OpCode::Add,
            Self::Sub => OpCode::Sub,
            Self::Mul => OpCode::Mul,
            Self::Div => OpCode::Div,
        }
    }

    /// The operator an opcode implements, if any.
    #[must_use]
    pub const fn from_opcode(op: OpCode) -> Option<Self> {
        match op {
            OpCode::Eq => Some(Self::Eq),
            OpCode::Less => Some(Self::Less),
            OpCode::LessEq => Some(Self::LessEq),
            OpCode::Greater => Some(Self::Greater),
            OpCode::GreaterEq => Some(Self::GreaterEq),
            OpCode::Add => Some(Self::Add),
            OpCode::Sub => Some(Self::Sub),
            OpCode::Mul => Some(Self::Mul),
            OpCode::Div => Some(Self::Div),
            _ => None,
        }
    }
}

/// Applies an operator to its operands, first operand first.
///
/// `(+)` is 0 and `(*)` is 1. Every other operator needs at least one
/// operand. Comparisons are chained and type-check every operand even once
/// the result is known.
///
/// # Errors
///
/// Returns a type mismatch for a non-number operand (except with `=`), an
/// arity mismatch for a missing operand, or division by zero.
pub fn apply_operator(op: Operator, args: &[Value]) -> Result<Value> {
    if op == Operator::Eq {
        if args.is_empty() {
            return Err(Error::arity_mismatch("at least 1", 0));
        }
        return Ok(Value::Bool(args.windows(2).all(|w| w[0] == w[1])));
    }

    let numbers = numbers(args)?;
    let Some((&first, rest)) = numbers.split_first() else {
        return match op {
            Operator::Add => Ok(Value::Number(0.0)),
            Operator::Mul => Ok(Value::Number(1.0)),
            _ => Err(Error::arity_mismatch("at least 1", 0)),
        };
    };

    let result = match op {
        Operator::Less => chain(&numbers, |a, b| a < b),
        Operator::LessEq => chain(&numbers, |a, b| a <= b),
        Operator::Greater => chain(&numbers, |a, b| a > b),
        Operator::GreaterEq => chain(&numbers, |a, b| a >= b),
        Operator::Add => Value::Number(numbers.iter().sum()),
        Operator::Mul => Value::Number(numbers.iter().product()),
        Operator::Sub if rest.is_empty() => Value::Number(-first),
        Operator::Sub => Value::Number(rest.iter().fold(first, |acc, n| acc - n)),
        Operator::Div if rest.is_empty() => Value::Number(divide(1.0, first)?),
        Operator::Div => {
            let mut acc = first;
            for &n in rest {
                acc = divide(acc, n)?;
            }
            Value::Number(acc)
        }
        Operator::Eq => Value::Bool(numbers.windows(2).all(|w| w[0] == w[1])),
    };
    Ok(result)
}

fn numbers(args: &[Value]) -> Result<Vec<Number>> {
    args.iter()
        .map(|v| {
            v.as_number()
                .ok_or_else(|| Error::type_mismatch(Type::Number, v.value_type()))
        })
        .collect()
}

fn chain(numbers: &[Number], cmp: impl Fn(Number, Number) -> bool) -> Value {
    Value::Bool(numbers.windows(2).all(|w| cmp(w[0], w[1])))
}

fn divide(a: Number, b: Number) -> Result<Number> {
    if b == 0.0 {
        Err(Error::new(ErrorKind::DivisionByZero))
    } else {
        Ok(a / b)
    }
}
