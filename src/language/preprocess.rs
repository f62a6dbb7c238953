//! Source clean-up run before lexing
//!
//! Removes `//` line comments, strips trailing spaces and tabs from every line, and makes sure the
//! text ends with a newline. Line structure is kept intact, so positions reported by later stages
//! still point into the original file.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)//[^\n]*$").expect("comment pattern is valid"));
static TRAILING_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[ \t]+$").expect("whitespace pattern is valid"));

pub fn preprocess(source: &str) -> String {
    let without_comments = LINE_COMMENT.replace_all(source, "");
    let trimmed = TRAILING_WHITESPACE.replace_all(&without_comments, "");
    ensure_source_ends_with_newline(&trimmed)
}

/// Append a newline unless the text already ends with one
pub fn ensure_source_ends_with_newline(source: &str) -> String {
    if source.ends_with('\n') {
        source.to_string()
    } else {
        format!("{source}\n")
    }
}
