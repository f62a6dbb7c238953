//! Table-driven parser
//!
//! Drives a token source through the tables built by [`crate::automaton::ParseTables`]. Two
//! parallel stacks are kept: automaton states (seeded with state 0) and parse tree nodes. Each
//! step looks up the action for the top state and the current token kind:
//! - shift pushes a leaf for the token and pulls the next one
//! - reduce pops one entry per right-hand-side symbol from both stacks, wraps the popped nodes in
//!   a node tagged with the rule's left-hand side and follows the goto for the uncovered state
//! - accept wraps whatever is on the node stack in a node tagged with the start symbol
//!
//! Missing cells are syntax errors reported at the offending token.

use crate::automaton::{Action, ParseTables};
use crate::grammar::Symbol;
use crate::lexing::{LexError, Position, Token};
use serde::Serialize;
use std::fmt;

/// A node of the concrete parse tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseNode {
    pub symbol: Symbol,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParseNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexeme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl ParseNode {
    /// Leaf for a shifted token
    pub fn leaf(token: Token) -> Self {
        Self {
            symbol: Symbol::Terminal(token.kind),
            children: Vec::new(),
            lexeme: Some(token.lexeme),
            position: Some(token.position),
        }
    }

    /// Internal node for a reduced production
    pub fn branch(lhs: impl Into<String>, children: Vec<ParseNode>) -> Self {
        Self {
            symbol: Symbol::NonTerminal(lhs.into()),
            children,
            lexeme: None,
            position: None,
        }
    }

    /// Grammar tag: token kind for leaves, rule name otherwise
    pub fn tag(&self) -> &str {
        self.symbol.name()
    }

    pub fn is_terminal(&self) -> bool {
        self.symbol.is_terminal()
    }

    /// Matched text of a leaf, empty for internal nodes
    pub fn lexeme(&self) -> &str {
        self.lexeme.as_deref().unwrap_or_default()
    }

    pub fn child(&self, index: usize) -> Option<&ParseNode> {
        self.children.get(index)
    }

    /// Terminal leaves in left-to-right order
    pub fn leaves(&self) -> Vec<&ParseNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a ParseNode>) {
        if self.is_terminal() {
            leaves.push(self);
        }
        for child in &self.children {
            child.collect_leaves(leaves);
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.symbol, indent = depth * 2)?;
        if let Some(lexeme) = &self.lexeme {
            write!(f, " {lexeme:?}")?;
        }
        for child in &self.children {
            writeln!(f)?;
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Errors raised while parsing a token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The token source failed
    Lexical(LexError),
    /// No action is defined for the current state and token
    Syntax { found: String, position: Position },
    /// The token source ran dry before the input was accepted
    UnexpectedEnd { position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lexical(err) => err.position(),
            ParseError::Syntax { position, .. } | ParseError::UnexpectedEnd { position } => {
                *position
            }
        }
    }

    fn syntax(token: &Token) -> Self {
        ParseError::Syntax {
            found: token.kind.clone(),
            position: token.position,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lexical(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lexical(err) => write!(f, "{err}"),
            ParseError::Syntax { found, position } => {
                write!(f, "Syntax error at {position} (unexpected {found})")
            }
            ParseError::UnexpectedEnd { position } => {
                write!(f, "Syntax error at {position} (input ended early)")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Shift-reduce parser over prebuilt tables
#[derive(Debug, Clone, Copy)]
pub struct Parser<'t> {
    tables: &'t ParseTables,
}

impl<'t> Parser<'t> {
    pub fn new(tables: &'t ParseTables) -> Self {
        Self { tables }
    }

    /// Parse a whole token stream into a tree rooted at the start symbol
    pub fn parse<I>(&self, tokens: I) -> Result<ParseNode, ParseError>
    where
        I: IntoIterator<Item = Result<Token, LexError>>,
    {
        let mut tokens = tokens.into_iter();
        let mut states: Vec<usize> = vec![0];
        let mut nodes: Vec<ParseNode> = Vec::new();
        let mut last_position = Position::default();

        let mut lookahead = pull(&mut tokens, &mut last_position)?;
        loop {
            let Some(token) = lookahead.take() else {
                return Err(ParseError::UnexpectedEnd {
                    position: last_position,
                });
            };
            let state = top(&states);

            match self.tables.action(state, &token.kind) {
                Some(Action::Shift(to)) => {
                    log::trace!("state {state}: shift '{}' -> {to}", token.kind);
                    states.push(to);
                    nodes.push(ParseNode::leaf(token));
                    lookahead = pull(&mut tokens, &mut last_position)?;
                }
                Some(Action::Reduce(rule)) => {
                    let production = self
                        .tables
                        .production(rule)
                        .ok_or_else(|| ParseError::syntax(&token))?;
                    let len = production.rhs.len();
                    if len > nodes.len() {
                        return Err(ParseError::syntax(&token));
                    }
                    let children = nodes.split_off(nodes.len() - len);
                    states.truncate(states.len() - len);

                    let to = self
                        .tables
                        .goto(top(&states), &production.lhs)
                        .ok_or_else(|| ParseError::syntax(&token))?;
                    log::trace!("state {state}: reduce by {production} -> {to}");
                    states.push(to);
                    nodes.push(ParseNode::branch(production.lhs.clone(), children));
                    lookahead = Some(token);
                }
                Some(Action::Accept) => {
                    return Ok(ParseNode::branch(self.tables.start(), nodes));
                }
                None => return Err(ParseError::syntax(&token)),
            }
        }
    }
}

fn top(states: &[usize]) -> usize {
    states.last().copied().unwrap_or_default()
}

fn pull<I>(tokens: &mut I, last_position: &mut Position) -> Result<Option<Token>, ParseError>
where
    I: Iterator<Item = Result<Token, LexError>>,
{
    let token = tokens.next().transpose()?;
    if let Some(token) = &token {
        *last_position = token.position;
    }
    Ok(token)
}
