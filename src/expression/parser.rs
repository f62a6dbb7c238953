//! Two-stack expression parser
//!
//! Expression literals are scanned once, left to right, with an operand stack and an operator
//! stack. Whether an operator is unary or binary depends only on the previous token: after an
//! operand it is binary, anywhere else it is a prefix.
//!
//! - Pushing an operand first wraps it in every unary operator waiting on top of the operator
//!   stack, innermost first, so `--3` composes as `-(-3)`
//! - A binary operator first applies the pending binary operators of greater or equal precedence
//!   (left associativity), then waits on the stack itself
//! - `)` applies operators down to the matching `(` and pushes the group as a fresh operand
//!
//! The result is an AST; nothing is evaluated here.

use super::operator::{BinaryOp, UnaryOp};
use super::{EvalError, Node};
use crate::lexing::{LexRules, Lexer, Token};
use once_cell::sync::Lazy;

const LEFT_PAREN: &str = "left-paren";
const RIGHT_PAREN: &str = "right-paren";
const VARIABLE: &str = "variable";
const CONSTANT: &str = "constant";
const OPERATOR: &str = "operator";
const LITERAL: &str = "literal";
const RANDOM: &str = "random";

static RULES: Lazy<LexRules> = Lazy::new(|| {
    LexRules::new(
        &[
            (LEFT_PAREN, r"\("),
            (RIGHT_PAREN, r"\)"),
            (VARIABLE, r"\$[\w\d_]+"),
            (CONSTANT, r"![\w\d_]+"),
            (OPERATOR, r"(>=|<=|>|<|~=|=|&|\||~|\+|-|\*|/|%)"),
            (LITERAL, r"\d+"),
            (RANDOM, r"r"),
        ],
        &[r"[ ]+"],
    )
    .expect("expression token patterns are valid")
});

/// Parse the body of an expression literal (the text between the brackets)
pub(super) fn parse_body(body: &str, text: &str) -> Result<Node, EvalError> {
    let tokens = Lexer::new(body, &RULES)
        .with_end_marker(false)
        .collect::<Result<Vec<Token>, _>>()
        .map_err(|_| EvalError::malformed(text))?;

    match tokens.split_first() {
        Some((first, rest)) if first.kind == RANDOM => parse_random(rest, text),
        _ => parse_infix(&tokens, text),
    }
}

/// `r A B` where both bounds are single, possibly prefixed, atoms
fn parse_random(tokens: &[Token], text: &str) -> Result<Node, EvalError> {
    let split = atom_len(tokens).ok_or_else(|| EvalError::malformed(text))?;
    let (low, high) = tokens.split_at(split);
    if atom_len(high) != Some(high.len()) {
        return Err(EvalError::malformed(text));
    }
    Ok(Node::Random(
        Box::new(parse_infix(low, text)?),
        Box::new(parse_infix(high, text)?),
    ))
}

/// Token count of the leading atom: unary prefixes, then an operand or a parenthesized group
fn atom_len(tokens: &[Token]) -> Option<usize> {
    let start = tokens.iter().take_while(|t| t.kind == OPERATOR).count();
    let head = tokens.get(start)?;
    match head.kind.as_str() {
        LITERAL | VARIABLE | CONSTANT => Some(start + 1),
        LEFT_PAREN => {
            let mut depth = 0usize;
            for (offset, token) in tokens[start..].iter().enumerate() {
                match token.kind.as_str() {
                    LEFT_PAREN => depth += 1,
                    RIGHT_PAREN => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(start + offset + 1);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    /// Open group, remembering the operand depth at which it was opened
    Paren(usize),
    Unary(UnaryOp),
    Binary(BinaryOp),
}

struct Builder<'t> {
    text: &'t str,
    operands: Vec<Node>,
    operators: Vec<Pending>,
}

impl<'t> Builder<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            operands: Vec::new(),
            operators: Vec::new(),
        }
    }

    fn malformed(&self) -> EvalError {
        EvalError::malformed(self.text)
    }

    fn push_operand(&mut self, mut node: Node) {
        while let Some(Pending::Unary(op)) = self.operators.last().copied() {
            self.operators.pop();
            node = Node::Unary(op, Box::new(node));
        }
        self.operands.push(node);
    }

    /// Pop the topmost binary operator and its two operands, push the combined node
    fn apply_last(&mut self) -> Result<(), EvalError> {
        let Some(Pending::Binary(op)) = self.operators.pop() else {
            return Err(self.malformed());
        };
        let (Some(rhs), Some(lhs)) = (self.operands.pop(), self.operands.pop()) else {
            return Err(self.malformed());
        };
        self.push_operand(Node::Binary(op, Box::new(lhs), Box::new(rhs)));
        Ok(())
    }

    fn close_group(&mut self) -> Result<(), EvalError> {
        let depth = loop {
            match self.operators.last().copied() {
                Some(Pending::Paren(depth)) => break depth,
                Some(_) => self.apply_last()?,
                None => return Err(self.malformed()),
            }
        };
        self.operators.pop();
        if self.operands.len() != depth + 1 {
            return Err(self.malformed());
        }
        let group = self.operands.pop().ok_or_else(|| self.malformed())?;
        self.push_operand(group);
        Ok(())
    }

    fn push_binary(&mut self, op: BinaryOp) -> Result<(), EvalError> {
        while let Some(Pending::Binary(top)) = self.operators.last().copied() {
            if top.precedence() < op.precedence() {
                break;
            }
            self.apply_last()?;
        }
        self.operators.push(Pending::Binary(op));
        Ok(())
    }

    fn finish(mut self) -> Result<Node, EvalError> {
        while let Some(pending) = self.operators.last().copied() {
            match pending {
                Pending::Binary(_) => self.apply_last()?,
                Pending::Paren(_) | Pending::Unary(_) => return Err(self.malformed()),
            }
        }
        if self.operands.len() != 1 {
            return Err(self.malformed());
        }
        self.operands.pop().ok_or_else(|| self.malformed())
    }
}

fn parse_infix(tokens: &[Token], text: &str) -> Result<Node, EvalError> {
    let mut builder = Builder::new(text);
    let mut after_operand = false;

    for token in tokens {
        match token.kind.as_str() {
            LEFT_PAREN => {
                builder
                    .operators
                    .push(Pending::Paren(builder.operands.len()));
                after_operand = false;
            }
            RIGHT_PAREN => {
                builder.close_group()?;
                after_operand = true;
            }
            OPERATOR if after_operand => {
                let op = BinaryOp::from_lexeme(&token.lexeme)
                    .ok_or_else(|| EvalError::malformed(text))?;
                builder.push_binary(op)?;
                after_operand = false;
            }
            OPERATOR => {
                let op = UnaryOp::from_lexeme(&token.lexeme)
                    .ok_or_else(|| EvalError::malformed(text))?;
                builder.operators.push(Pending::Unary(op));
            }
            LITERAL => {
                let value = token
                    .lexeme
                    .parse::<i64>()
                    .map_err(|_| EvalError::Overflow {
                        expression: text.to_string(),
                    })?;
                builder.push_operand(Node::Literal(value));
                after_operand = true;
            }
            VARIABLE => {
                builder.push_operand(Node::Variable(token.lexeme.clone()));
                after_operand = true;
            }
            CONSTANT => {
                builder.push_operand(Node::Constant(token.lexeme.clone()));
                after_operand = true;
            }
            _ => return Err(EvalError::malformed(text)),
        }
    }

    builder.finish()
}
