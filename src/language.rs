//! The game language
//!
//! Lexical rules and grammar of the retro game language, expressed as data for the generic
//! [`crate::lexing`] and [`crate::automaton`] engines.
//!
//! A program names its initial state on the first line, followed by shape and state definitions:
//!
//! ```text
//! ~title
//! #ball {
//! .#.
//! ###
//! .#.
//! }
//! ~title {
//!   clear
//!   display #ball @ ([$x], [!H / 2])
//!   @A {
//!     goto ~play
//!   }
//! }
//! ```
//!
//! Shape bodies must start at the first column: `.` is transparent, `+` white and `#` black.

mod preprocess;
pub mod symbols;

pub use preprocess::{ensure_source_ends_with_newline, preprocess};

use crate::grammar::{Grammar, Symbol};
use crate::lexing::LexRules;
use once_cell::sync::Lazy;
use symbols::*;

/// Start symbol of the language grammar
pub const START: &str = PROG;

static LEX_RULES: Lazy<LexRules> = Lazy::new(|| {
    LexRules::new(
        &[
            // Keywords
            (GOTO, r"goto"),
            (CLEAR, r"clear"),
            (DISPLAY, r"display"),
            (IF, r"if"),
            (NOT, r"not"),
            (RANDOM, r"r"),
            // Names
            (STATE_NAME, r"~[\w\d_]+"),
            (SHAPE_NAME, r"#[\w\d_]+"),
            (HANDLER_NAME, r"@(X|Y|A|B|START)"),
            (VARIABLE, r"\$[\w\d_]+"),
            // Punctuation
            (ASSIGN, r"="),
            (AT, r"@"),
            (COMMA, r","),
            (LEFT_BRACE, r"\{"),
            (RIGHT_BRACE, r"\}"),
            (LEFT_PAREN, r"\("),
            (RIGHT_PAREN, r"\)"),
            // Literals
            (SHAPE, r"[.#+][.#+\n]+"),
            (SINGLE_EXPRESSION, r"\[[-+*/%><=|&~$()!\d\w_ ]+\]"),
            (NEWLINE, r"\n+"),
        ],
        &[r"[ \t]+"],
    )
    .expect("language token patterns are valid")
});

/// Ordered token rules of the language
pub fn lex_rules() -> &'static LexRules {
    &LEX_RULES
}

fn t(name: &str) -> Symbol {
    Symbol::terminal(name)
}

fn nt(name: &str) -> Symbol {
    Symbol::nonterminal(name)
}

/// Grammar of the language, rooted at [`START`]
pub fn grammar() -> Grammar {
    let nl = || t(NEWLINE);
    // Block bodies share one shape: `{` NL list NL `}`
    let block = |body: &str| vec![t(LEFT_BRACE), nl(), nt(body), nl(), t(RIGHT_BRACE)];
    let list = |name: &str, item: &str| [vec![nt(name), nl(), nt(item)], vec![nt(item)]];
    let simple_stmts = || {
        [
            vec![nt(VARIABLE_UPDATE_STMT)],
            vec![nt(SCREEN_UPDATE_STMT)],
            vec![nt(GOTO_STMT)],
            vec![nt(SELECTION_STMT)],
        ]
    };

    let mut grammar = Grammar::new();
    grammar
        .add(
            PROG,
            [vec![
                t(STATE_NAME),
                nl(),
                nt(TOP_LEVEL_STMTS),
                nl(),
                Symbol::end_marker(),
            ]],
        )
        .add(TOP_LEVEL_STMTS, list(TOP_LEVEL_STMTS, TOP_LEVEL_STMT))
        .add(TOP_LEVEL_STMT, [vec![nt(SHAPE_DEF)], vec![nt(STATE_DEF)]])
        .add(
            SHAPE_DEF,
            [vec![
                t(SHAPE_NAME),
                t(LEFT_BRACE),
                nl(),
                t(SHAPE),
                t(RIGHT_BRACE),
            ]],
        )
        .add(STATE_DEF, [[vec![t(STATE_NAME)], block(INSTATE_STMTS)].concat()])
        .add(INSTATE_STMTS, list(INSTATE_STMTS, INSTATE_STMT))
        .add(
            INSTATE_STMT,
            simple_stmts()
                .into_iter()
                .chain([vec![nt(BTN_HANDLER)]]),
        )
        .add(
            EXPRESSION,
            [
                vec![t(SINGLE_EXPRESSION)],
                vec![t(RANDOM), t(SINGLE_EXPRESSION), t(SINGLE_EXPRESSION)],
            ],
        )
        .add(
            VARIABLE_UPDATE_STMT,
            [vec![t(VARIABLE), t(ASSIGN), nt(EXPRESSION)]],
        )
        .add(
            SCREEN_UPDATE_STMT,
            [
                vec![t(CLEAR)],
                vec![
                    t(DISPLAY),
                    t(SHAPE_NAME),
                    t(AT),
                    t(LEFT_PAREN),
                    nt(EXPRESSION),
                    t(COMMA),
                    nt(EXPRESSION),
                    t(RIGHT_PAREN),
                ],
            ],
        )
        .add(GOTO_STMT, [vec![t(GOTO), t(STATE_NAME)]])
        .add(SELECTION_STMT, [vec![nt(IF_STMT)], vec![nt(IF_NOT_STMT)]])
        .add(
            IF_STMT,
            [[vec![t(IF), nt(EXPRESSION)], block(INIF_STMTS)].concat()],
        )
        .add(
            IF_NOT_STMT,
            [[vec![t(IF), t(NOT), nt(EXPRESSION)], block(INIF_STMTS)].concat()],
        )
        .add(INIF_STMTS, list(INIF_STMTS, INIF_STMT))
        .add(INIF_STMT, simple_stmts())
        .add(
            BTN_HANDLER,
            [[vec![t(HANDLER_NAME)], block(INHANDLER_STMTS)].concat()],
        )
        .add(INHANDLER_STMTS, list(INHANDLER_STMTS, INHANDLER_STMT))
        .add(INHANDLER_STMT, simple_stmts());
    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::ParseTables;
    use crate::lexing::{tokenize, END_MARKER};
    use std::collections::BTreeSet;

    fn kinds(source: &str) -> Vec<String> {
        tokenize(source, lex_rules())
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_grammar_builds_without_conflicts() {
        let tables = ParseTables::build(&grammar(), START).unwrap();
        assert_eq!(tables.productions()[0].lhs, PROG);
        assert!(tables.state_count() > 1);
    }

    #[test]
    fn test_every_grammar_terminal_has_a_token_rule() {
        let rule_kinds: BTreeSet<&str> = lex_rules().rules().iter().map(|r| r.kind()).collect();
        for (_, alternatives) in grammar().iter() {
            for rhs in alternatives {
                for symbol in rhs.symbols() {
                    if symbol.is_terminal() && !symbol.is_end_marker() {
                        assert!(rule_kinds.contains(symbol.name()), "{symbol}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_statement_tokens() {
        assert_eq!(
            kinds("$x = r [1] [$y + 2]\n"),
            vec![
                VARIABLE,
                ASSIGN,
                RANDOM,
                SINGLE_EXPRESSION,
                SINGLE_EXPRESSION,
                NEWLINE,
                END_MARKER
            ]
        );
        assert_eq!(
            kinds("display #ball @ ([1], [2])"),
            vec![
                DISPLAY,
                SHAPE_NAME,
                AT,
                LEFT_PAREN,
                SINGLE_EXPRESSION,
                COMMA,
                SINGLE_EXPRESSION,
                RIGHT_PAREN,
                END_MARKER
            ]
        );
        assert_eq!(
            kinds("if not [~$a] {\n\n@START {\ngoto ~end"),
            vec![
                IF,
                NOT,
                SINGLE_EXPRESSION,
                LEFT_BRACE,
                NEWLINE,
                HANDLER_NAME,
                LEFT_BRACE,
                NEWLINE,
                GOTO,
                STATE_NAME,
                END_MARKER
            ]
        );
    }

    #[test]
    fn test_shape_literal_spans_lines() {
        let tokens = tokenize("#dot {\n#+.\n.#.\n}\n", lex_rules()).unwrap();
        let kinds: Vec<&str> = tokens.iter().map(|token| token.kind.as_str()).collect();

        assert_eq!(
            kinds,
            vec![SHAPE_NAME, LEFT_BRACE, NEWLINE, SHAPE, RIGHT_BRACE, NEWLINE, END_MARKER]
        );
        assert_eq!(tokens[3].lexeme, "#+.\n.#.\n");
    }
}
