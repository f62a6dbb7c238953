//! Lexer
//!
//! A generic, table-driven lexer. It knows nothing about the game language: callers hand it an
//! ordered list of `(kind, pattern)` rules plus a list of ignorable patterns, and it produces a
//! lazy stream of [`Token`]s.
//!
//! Matching works on the remaining input only:
//! 1. Ignorable prefixes are stripped greedily (any number, in any order)
//! 2. Rules are tried in declaration order, the first prefix match wins
//! 3. When the input is exhausted a single end-marker token is emitted (if enabled), after which
//!    the lexer reports exhaustion
//!
//! Every pattern is anchored at the start of the remaining input, so a rule can never skip
//! characters to find a later match.

use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Token kind reserved for the synthesized end of input token.
pub const END_MARKER: &str = "__eof__";

/// A 1-based line/column position in the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Advance over `text`, resetting the column after every newline
    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A lexeme tagged with the kind of the rule that matched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: String,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: impl Into<String>, lexeme: impl Into<String>, position: Position) -> Self {
        Self {
            kind: kind.into(),
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn is_end_marker(&self) -> bool {
        self.kind == END_MARKER
    }
}

/// Errors raised while tokenizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No rule matches at the current offset
    UnexpectedInput { snippet: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedInput { position, .. } => *position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedInput { snippet, position } => {
                write!(f, "Unexpected token {snippet}... at {position}")
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Compile `pattern` so that it only ever matches at the start of the haystack
fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})"))
}

/// A single tokenizing rule
#[derive(Debug, Clone)]
pub struct TokenRule {
    kind: String,
    pattern: Regex,
}

impl TokenRule {
    pub fn new(kind: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind: kind.into(),
            pattern: anchored(pattern)?,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Length in bytes of the non-empty prefix of `input` matched by this rule
    fn prefix_len(&self, input: &str) -> Option<usize> {
        self.pattern
            .find(input)
            .map(|m| m.end())
            .filter(|len| *len > 0)
    }
}

/// The ordered rule table a [`Lexer`] runs against
#[derive(Debug, Clone, Default)]
pub struct LexRules {
    rules: Vec<TokenRule>,
    ignore: Vec<Regex>,
}

impl LexRules {
    /// Build a rule table from `(kind, pattern)` pairs and ignorable patterns
    pub fn new(rules: &[(&str, &str)], ignore: &[&str]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(kind, pattern)| TokenRule::new(*kind, pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let ignore = ignore
            .iter()
            .map(|pattern| anchored(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules, ignore })
    }

    pub fn rules(&self) -> &[TokenRule] {
        &self.rules
    }

    /// Byte length of the longest run of ignorable prefixes at the start of `input`
    fn ignorable_prefix_len(&self, input: &str) -> usize {
        let mut skipped = 0;
        loop {
            let before = skipped;
            for pattern in &self.ignore {
                if let Some(m) = pattern.find(&input[skipped..]) {
                    skipped += m.end();
                }
            }
            if skipped == before {
                return skipped;
            }
        }
    }
}

/// Pull-based lexer over a borrowed source text
///
/// The lexer is finite and non-restartable: once it has reported exhaustion (or an error) every
/// further call returns `None`.
#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    rules: &'a LexRules,
    offset: usize,
    position: Position,
    emit_end_marker: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer that emits a trailing end-marker token
    pub fn new(source: &'a str, rules: &'a LexRules) -> Self {
        Self {
            source,
            rules,
            offset: 0,
            position: Position::default(),
            emit_end_marker: true,
            done: false,
        }
    }

    /// Enable or disable the synthesized end-marker token
    pub fn with_end_marker(mut self, emit: bool) -> Self {
        self.emit_end_marker = emit;
        self
    }

    fn consume(&mut self, len: usize) -> &'a str {
        let text = &self.source[self.offset..self.offset + len];
        self.position.advance(text);
        self.offset += len;
        text
    }

    /// Pull the next token, `Ok(None)` once the input is exhausted
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        if self.done {
            return Ok(None);
        }

        let skip = self.rules.ignorable_prefix_len(&self.source[self.offset..]);
        self.consume(skip);

        let remaining = &self.source[self.offset..];
        if remaining.is_empty() {
            self.done = true;
            return Ok(self
                .emit_end_marker
                .then(|| Token::new(END_MARKER, "", self.position)));
        }

        for rule in &self.rules.rules {
            if let Some(len) = rule.prefix_len(remaining) {
                let position = self.position;
                let lexeme = self.consume(len);
                return Ok(Some(Token::new(rule.kind(), lexeme, position)));
            }
        }

        self.done = true;
        Err(LexError::UnexpectedInput {
            snippet: remaining.chars().take(3).collect(),
            position: self.position,
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Tokenize a whole source text eagerly
pub fn tokenize(source: &str, rules: &LexRules) -> Result<Vec<Token>, LexError> {
    Lexer::new(source, rules).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_rules() -> LexRules {
        LexRules::new(
            &[("number", r"\d+"), ("word", r"[a-z]+"), ("newline", r"\n+")],
            &[r"[ \t]+"],
        )
        .unwrap()
    }

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn test_tokenizes_with_end_marker() {
        let rules = word_rules();
        let tokens = tokenize("abc 12", &rules).unwrap();

        assert_eq!(kinds(&tokens), vec!["word", "number", END_MARKER]);
        assert_eq!(tokens[0].lexeme, "abc");
        assert_eq!(tokens[1].lexeme, "12");
        assert_eq!(tokens[1].position, Position::new(1, 5));
        assert!(tokens[2].is_end_marker());
        assert_eq!(tokens[2].position, Position::new(1, 7));
    }

    #[test]
    fn test_end_marker_can_be_disabled() {
        let rules = word_rules();
        let tokens: Vec<_> = Lexer::new("abc", &rules)
            .with_end_marker(false)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(kinds(&tokens), vec!["word"]);
    }

    #[test]
    fn test_exhausted_lexer_stays_exhausted() {
        let rules = word_rules();
        let mut lexer = Lexer::new("", &rules);
        assert!(lexer.next_token().unwrap().unwrap().is_end_marker());
        assert_eq!(lexer.next_token().unwrap(), None);
        assert_eq!(lexer.next_token().unwrap(), None);
    }

    #[test]
    fn test_positions_track_newlines() {
        let rules = word_rules();
        let tokens = tokenize("ab\n\n  cd 7", &rules).unwrap();

        assert_eq!(tokens[1].kind, "newline");
        assert_eq!(tokens[1].lexeme, "\n\n");
        assert_eq!(tokens[2].position, Position::new(3, 3));
        assert_eq!(tokens[3].position, Position::new(3, 6));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = LexRules::new(&[("if", "if"), ("ident", "[a-z]+")], &[" "]).unwrap();
        let tokens = tokenize("if iffy", &rules).unwrap();
        // Order beats length: "iffy" starts with the keyword
        assert_eq!(kinds(&tokens), vec!["if", "if", "ident", END_MARKER]);
        assert_eq!(tokens[2].lexeme, "fy");
    }

    #[test]
    fn test_unexpected_input_reports_position() {
        let rules = word_rules();
        let mut lexer = Lexer::new("ab\n  ?!x", &rules);
        assert_eq!(lexer.next().unwrap().unwrap().lexeme, "ab");
        assert_eq!(lexer.next().unwrap().unwrap().kind, "newline");

        let err = lexer.next().unwrap().unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedInput {
                snippet: "?!x".to_string(),
                position: Position::new(2, 3),
            }
        );
        assert_eq!(err.to_string(), "Unexpected token ?!x... at 2:3");
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_empty_matches_are_ignored() {
        let rules = LexRules::new(&[("maybe", "a*"), ("b", "b")], &["x*"]).unwrap();
        let tokens = tokenize("bab", &rules).unwrap();
        assert_eq!(kinds(&tokens), vec!["b", "maybe", "b", END_MARKER]);
    }

    #[test]
    fn test_multiple_ignorable_patterns_interleave() {
        let rules = LexRules::new(&[("word", "[a-z]+")], &[" +", r"\t+"]).unwrap();
        let tokens = tokenize(" \t \tab", &rules).unwrap();
        assert_eq!(tokens[0].position, Position::new(1, 5));
    }
}
