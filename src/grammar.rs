//! Grammar model
//!
//! A grammar is plain data: a map from left-hand-side names to ordered lists of alternative
//! right-hand sides. The automaton builder reads it, nothing here runs an algorithm.

use crate::lexing::END_MARKER;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A right-hand-side symbol
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Symbol {
    /// Matches a token kind
    Terminal(String),
    /// Matches another grammar rule
    NonTerminal(String),
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol::Terminal(name.into())
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        Symbol::NonTerminal(name.into())
    }

    /// The reserved end of input terminal
    pub fn end_marker() -> Self {
        Symbol::Terminal(END_MARKER.to_string())
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_end_marker(&self) -> bool {
        matches!(self, Symbol::Terminal(name) if name == END_MARKER)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(name) => write!(f, "'{name}'"),
            Symbol::NonTerminal(name) => write!(f, "{name}"),
        }
    }
}

/// One alternative of a grammar rule
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rhs(Vec<Symbol>);

impl Rhs {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.0.get(index)
    }
}

impl From<Vec<Symbol>> for Rhs {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

/// Errors raised while reading a grammar or building its automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A nonterminal was referenced but never defined
    UnknownRule(String),
    /// The start symbol has no alternatives
    NoProductions(String),
    /// Two actions compete for the same table cell
    IllFormed(crate::automaton::Conflict),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UnknownRule(lhs) => {
                write!(f, "Grammar rule for LHS '{lhs}' does not exist")
            }
            GrammarError::NoProductions(start) => {
                write!(f, "Start symbol '{start}' has no productions")
            }
            GrammarError::IllFormed(conflict) => write!(f, "Ill-formed grammar: {conflict}"),
        }
    }
}

impl std::error::Error for GrammarError {}

/// Rule container, kept in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    rules: IndexMap<String, Vec<Rhs>>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the alternatives for `lhs`, replacing any previous registration
    pub fn add<I, R>(&mut self, lhs: impl Into<String>, alternatives: I) -> &mut Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rhs>,
    {
        self.rules
            .insert(lhs.into(), alternatives.into_iter().map(Into::into).collect());
        self
    }

    /// Alternatives for `lhs`
    pub fn rhs(&self, lhs: &str) -> Result<&[Rhs], GrammarError> {
        self.rules
            .get(lhs)
            .map(Vec::as_slice)
            .ok_or_else(|| GrammarError::UnknownRule(lhs.to_string()))
    }

    pub fn contains(&self, lhs: &str) -> bool {
        self.rules.contains_key(lhs)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rhs])> {
        self.rules.iter().map(|(lhs, rhs)| (lhs.as_str(), rhs.as_slice()))
    }
}

impl fmt::Display for Grammar {
    /// BNF-like listing with aligned `:=` and one alternative per line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rules.keys().map(|lhs| lhs.len()).max().unwrap_or(0);
        for (i, (lhs, alternatives)) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{lhs:<width$} :=")?;
            for (j, rhs) in alternatives.iter().enumerate() {
                if j > 0 {
                    write!(f, "\n{:width$}  |", "")?;
                }
                write!(f, " {rhs}")?;
            }
        }
        Ok(())
    }
}
