//! Compiler pipeline
//!
//! Chains the stages of the crate into a single entry point:
//!
//! 1. **Preprocessing** - comments and trailing blanks are removed, a final newline is ensured
//! 2. **Lexing** - the language token rules turn the text into tokens
//! 3. **Parsing** - the table-driven parser builds a tree rooted at [`language::START`]
//! 4. **Lowering** - the tree becomes a runnable [`Game`]
//!
//! The parse tables depend only on the language grammar, so a [`Compiler`] builds them once and
//! reuses them for every source it compiles. The intermediate stages are exposed for tooling.

use crate::automaton::ParseTables;
use crate::grammar::GrammarError;
use crate::language;
use crate::lexing::{tokenize, LexError, Lexer, Position, Token};
use crate::lowering::{lower, LowerError};
use crate::parsing::{ParseError, ParseNode, Parser};
use crate::runtime::{Game, GameSettings, InvalidSettings};
use std::fmt;

/// Errors raised while turning a source text into a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Settings(InvalidSettings),
    /// The language grammar failed to compile into tables
    Grammar(GrammarError),
    Lexical(LexError),
    Syntax(ParseError),
    Lowering(LowerError),
}

impl CompileError {
    /// 1-based source position of the error, when it has one
    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Settings(_) | CompileError::Grammar(_) => None,
            CompileError::Lexical(err) => Some(err.position()),
            CompileError::Syntax(err) => Some(err.position()),
            CompileError::Lowering(err) => err.position(),
        }
    }
}

impl From<InvalidSettings> for CompileError {
    fn from(err: InvalidSettings) -> Self {
        CompileError::Settings(err)
    }
}

impl From<GrammarError> for CompileError {
    fn from(err: GrammarError) -> Self {
        CompileError::Grammar(err)
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lexical(err)
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Lexical(err) => CompileError::Lexical(err),
            other => CompileError::Syntax(other),
        }
    }
}

impl From<LowerError> for CompileError {
    fn from(err: LowerError) -> Self {
        CompileError::Lowering(err)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Settings(err) => write!(f, "{err}"),
            CompileError::Grammar(err) => write!(f, "Language grammar is broken: {err}"),
            CompileError::Lexical(err) => write!(f, "{err}"),
            CompileError::Syntax(err) => write!(f, "{err}"),
            CompileError::Lowering(err) => match err.position() {
                Some(position) => write!(f, "{err} at {position}"),
                None => write!(f, "{err}"),
            },
        }
    }
}

impl std::error::Error for CompileError {}

/// Compiles game sources with fixed settings
#[derive(Debug, Clone)]
pub struct Compiler {
    settings: GameSettings,
    tables: ParseTables,
}

impl Compiler {
    /// Validate the settings and build the language tables
    pub fn new(settings: GameSettings) -> Result<Self, CompileError> {
        settings.validate()?;
        let tables = ParseTables::build(&language::grammar(), language::START)?;
        log::debug!(
            "language tables: {} states, {} productions",
            tables.state_count(),
            tables.productions().len()
        );
        Ok(Self { settings, tables })
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn tables(&self) -> &ParseTables {
        &self.tables
    }

    /// Preprocess and tokenize, end-marker included
    pub fn tokens(&self, source: &str) -> Result<Vec<Token>, CompileError> {
        let source = language::preprocess(source);
        Ok(tokenize(&source, language::lex_rules())?)
    }

    /// Preprocess, tokenize and parse
    pub fn parse_tree(&self, source: &str) -> Result<ParseNode, CompileError> {
        let source = language::preprocess(source);
        let lexer = Lexer::new(&source, language::lex_rules());
        Ok(Parser::new(&self.tables).parse(lexer)?)
    }

    /// Run the whole pipeline
    pub fn compile(&self, source: &str) -> Result<Game, CompileError> {
        let tree = self.parse_tree(source)?;
        Ok(lower(&tree, self.settings)?)
    }
}

/// Compile a single source; builds the tables on every call
pub fn compile(source: &str, settings: GameSettings) -> Result<Game, CompileError> {
    Compiler::new(settings)?.compile(source)
}
