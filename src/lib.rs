//! # retro
//!
//! Compiler and interpreter for a small language describing games for a retro handheld: a
//! monochrome pixel display, five buttons and a fixed frame rate.
//!
//! File Layout
//!
//! The crate is organised as a pipeline, one module per stage. The lexer, grammar model, automaton
//! builder and parser are generic and know nothing about games; the game language is supplied to
//! them as data by the language module.
//!
//! src/
//!   ├── lexing        Ordered regex token rules and a pull lexer
//!   ├── grammar       Symbols, productions and the grammar container
//!   ├── automaton     LR(0) item sets and action/goto tables
//!   ├── parsing       Table-driven shift-reduce parser producing parse trees
//!   ├── expression    Integer expressions inside `[...]` literals
//!   ├── language      Token rules, grammar and preprocessor of the game language
//!   ├── lowering      Parse tree to game
//!   ├── runtime       Game states, statements, shapes and the display
//!   └── pipeline      Preprocess, lex, parse and lower in one call
//!
//! The quickest way in is [`pipeline::compile`]; the `retro` binary wraps it with a terminal
//! console and a few inspection commands.

#![allow(rustdoc::invalid_html_tags)]

pub mod automaton;
pub mod expression;
pub mod grammar;
pub mod language;
pub mod lexing;
pub mod lowering;
pub mod parsing;
pub mod pipeline;
pub mod runtime;
