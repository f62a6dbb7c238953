//! Unary and binary operators of the expression language

use std::fmt;

/// Prefix operators, applied as soon as their operand is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    /// Logical negation: 1 for zero, 0 otherwise
    Not,
}

impl UnaryOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "+" => Some(UnaryOp::Plus),
            "-" => Some(UnaryOp::Minus),
            "~" => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "~",
        }
    }

    /// `None` on overflow
    pub fn apply(self, operand: i64) -> Option<i64> {
        match self {
            UnaryOp::Plus => Some(operand),
            UnaryOp::Minus => operand.checked_neg(),
            UnaryOp::Not => Some(i64::from(operand == 0)),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Infix operators, all left-associative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

/// Reasons a binary operation has no result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticFault {
    DivisionByZero,
    Overflow,
}

impl BinaryOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        let op = match lexeme {
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "=" => BinaryOp::Eq,
            "~=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "&" => BinaryOp::And,
            "|" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "~=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }

    /// Binding strength, higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 4,
            BinaryOp::Add | BinaryOp::Sub => 3,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge => 2,
            BinaryOp::And | BinaryOp::Or => 1,
        }
    }

    /// Division and modulo round toward negative infinity
    pub fn apply(self, lhs: i64, rhs: i64) -> Result<i64, ArithmeticFault> {
        let truth = |holds: bool| Ok(i64::from(holds));
        match self {
            BinaryOp::Mul => lhs.checked_mul(rhs).ok_or(ArithmeticFault::Overflow),
            BinaryOp::Div => floor_div(lhs, rhs),
            BinaryOp::Mod => floor_mod(lhs, rhs),
            BinaryOp::Add => lhs.checked_add(rhs).ok_or(ArithmeticFault::Overflow),
            BinaryOp::Sub => lhs.checked_sub(rhs).ok_or(ArithmeticFault::Overflow),
            BinaryOp::Eq => truth(lhs == rhs),
            BinaryOp::Ne => truth(lhs != rhs),
            BinaryOp::Lt => truth(lhs < rhs),
            BinaryOp::Gt => truth(lhs > rhs),
            BinaryOp::Le => truth(lhs <= rhs),
            BinaryOp::Ge => truth(lhs >= rhs),
            BinaryOp::And => truth(lhs != 0 && rhs != 0),
            BinaryOp::Or => truth(lhs != 0 || rhs != 0),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn floor_div(lhs: i64, rhs: i64) -> Result<i64, ArithmeticFault> {
    if rhs == 0 {
        return Err(ArithmeticFault::DivisionByZero);
    }
    let quotient = lhs.checked_div(rhs).ok_or(ArithmeticFault::Overflow)?;
    if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn floor_mod(lhs: i64, rhs: i64) -> Result<i64, ArithmeticFault> {
    if rhs == 0 {
        return Err(ArithmeticFault::DivisionByZero);
    }
    let remainder = lhs.checked_rem(rhs).ok_or(ArithmeticFault::Overflow)?;
    if remainder != 0 && (remainder < 0) != (rhs < 0) {
        Ok(remainder + rhs)
    } else {
        Ok(remainder)
    }
}
