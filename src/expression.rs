//! Expression evaluator
//!
//! Expression literals are the bracketed `[...]` lexemes of the game language. They are parsed
//! once into a small AST (see [`parser`]) and evaluated on demand against an [`Environment`],
//! which supplies variables, constants and random numbers.
//!
//! Arithmetic is 64-bit signed and checked. Division and modulo round toward negative infinity,
//! comparisons and logical operators produce 0 or 1, and any nonzero operand counts as true.
//!
//! Two random forms exist: the statement-level `r [a] [b]` (see [`Expression::random`]) and the
//! inline `[r A B]`. Both evaluate their bounds, order them, and draw uniformly from the closed
//! range.

mod operator;
mod parser;

#[cfg(test)]
mod tests;

pub use operator::{ArithmeticFault, BinaryOp, UnaryOp};

use std::fmt;

/// Evaluation context of an expression
pub trait Environment {
    /// Current value of `$name`; unset variables read as 0
    fn variable(&self, name: &str) -> i64;
    /// Value of `!name`, if defined
    fn constant(&self, name: &str) -> Option<i64>;
    /// A uniformly distributed integer in `low..=high`, with `low <= high`
    fn random_range(&mut self, low: i64, high: i64) -> i64;
}

/// Errors raised while parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    DivisionByZero { expression: String },
    /// Unbalanced parentheses, unknown tokens or operators without operands
    Malformed { expression: String },
    UnknownConstant { expression: String, name: String },
    Overflow { expression: String },
}

impl EvalError {
    pub(crate) fn malformed(expression: &str) -> Self {
        EvalError::Malformed {
            expression: expression.to_string(),
        }
    }

    /// Text of the expression the error came from
    pub fn expression(&self) -> &str {
        match self {
            EvalError::DivisionByZero { expression }
            | EvalError::Malformed { expression }
            | EvalError::UnknownConstant { expression, .. }
            | EvalError::Overflow { expression } => expression,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DivisionByZero { expression } => {
                write!(f, "Cannot divide by zero, problem in expression {expression}")
            }
            EvalError::Malformed { expression } => write!(f, "Invalid expression {expression}"),
            EvalError::UnknownConstant { expression, name } => {
                write!(f, "Unknown constant {name} in expression {expression}")
            }
            EvalError::Overflow { expression } => {
                write!(f, "Integer overflow in expression {expression}")
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Expression AST
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(i64),
    /// `$name`, stored with its sigil
    Variable(String),
    /// `!name`, stored with its sigil
    Constant(String),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    /// Closed random range; bounds may come in either order
    Random(Box<Node>, Box<Node>),
}

impl Node {
    fn evaluate<E>(&self, env: &mut E, text: &str) -> Result<i64, EvalError>
    where
        E: Environment + ?Sized,
    {
        let overflow = || EvalError::Overflow {
            expression: text.to_string(),
        };
        match self {
            Node::Literal(value) => Ok(*value),
            Node::Variable(name) => Ok(env.variable(name)),
            Node::Constant(name) => env.constant(name).ok_or_else(|| EvalError::UnknownConstant {
                expression: text.to_string(),
                name: name.clone(),
            }),
            Node::Unary(op, operand) => {
                let value = operand.evaluate(env, text)?;
                op.apply(value).ok_or_else(overflow)
            }
            Node::Binary(op, lhs, rhs) => {
                let lhs = lhs.evaluate(env, text)?;
                let rhs = rhs.evaluate(env, text)?;
                op.apply(lhs, rhs).map_err(|fault| match fault {
                    ArithmeticFault::DivisionByZero => EvalError::DivisionByZero {
                        expression: text.to_string(),
                    },
                    ArithmeticFault::Overflow => overflow(),
                })
            }
            Node::Random(first, second) => {
                let first = first.evaluate(env, text)?;
                let second = second.evaluate(env, text)?;
                Ok(env.random_range(first.min(second), first.max(second)))
            }
        }
    }
}

impl fmt::Display for Node {
    /// Fully parenthesized rendering, one pair per binary operation
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => write!(f, "{value}"),
            Node::Variable(name) | Node::Constant(name) => f.write_str(name),
            Node::Unary(op, operand) => write!(f, "{op}{operand}"),
            Node::Binary(op, lhs, rhs) => write!(f, "({lhs} {op} {rhs})"),
            Node::Random(low, high) => write!(f, "r({low}, {high})"),
        }
    }
}

/// A parsed expression together with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    text: String,
    root: Node,
}

impl Expression {
    /// Parse a bracketed expression literal such as `[$x + 1]`
    pub fn parse(text: &str) -> Result<Self, EvalError> {
        let body = text
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| EvalError::malformed(text))?;
        let root = parser::parse_body(body, text)?;
        Ok(Self {
            text: text.to_string(),
            root,
        })
    }

    /// Statement-level random form `r [a] [b]`
    pub fn random(first: Expression, second: Expression) -> Self {
        Self {
            text: format!("r {} {}", first.text, second.text),
            root: Node::Random(Box::new(first.root), Box::new(second.root)),
        }
    }

    /// A constant-valued expression
    pub fn literal(value: i64) -> Self {
        Self {
            text: format!("[{value}]"),
            root: Node::Literal(value),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn evaluate<E>(&self, env: &mut E) -> Result<i64, EvalError>
    where
        E: Environment + ?Sized,
    {
        self.root.evaluate(env, &self.text)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Parse and evaluate `text` in one go
pub fn evaluate<E>(text: &str, env: &mut E) -> Result<i64, EvalError>
where
    E: Environment + ?Sized,
{
    Expression::parse(text)?.evaluate(env)
}
