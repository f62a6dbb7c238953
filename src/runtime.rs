//! Runtime interpreter
//!
//! A compiled [`Game`] is a state machine: each named [`GameState`] owns a list of statements run
//! once per [`Game::tick`] and up to one handler list per [`Button`]. The interpreter core never
//! drives itself; a presentation layer calls `tick` at a fixed rate and forwards button presses.
//!
//! Statement lists run to completion unless a `goto` executes. A `goto` switches the current state
//! and returns [`Flow::Transferred`], which every enclosing block passes on unchanged, so it ends
//! the whole tick or handler call it happens in, however deeply it is nested.

mod display;
mod game;
mod shape;
mod statement;

#[cfg(test)]
mod tests;

pub use display::Display;
pub use game::{Game, GameSettings, GameState, InvalidSettings, Machine, MAX_DIMENSION};
pub use shape::{InvalidPixel, Pixel, Shape};
pub use statement::{execute_block, Statement};

use crate::expression::EvalError;
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Shapes by name, in definition order
pub type Shapes = IndexMap<String, Shape>;

/// Outcome of running a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Carry on with the next statement
    Continue,
    /// A `goto` ran; the rest of the tick or handler is skipped
    Transferred,
}

/// The five buttons of the handheld
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Button {
    X,
    Y,
    A,
    B,
    Start,
}

impl Button {
    pub const ALL: [Button; 5] = [Button::X, Button::Y, Button::A, Button::B, Button::Start];

    /// Button for a handler label such as `@START`
    pub fn from_handler_name(name: &str) -> Option<Self> {
        match name {
            "@X" => Some(Button::X),
            "@Y" => Some(Button::Y),
            "@A" => Some(Button::A),
            "@B" => Some(Button::B),
            "@START" => Some(Button::Start),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Button::X => "X",
            Button::Y => "Y",
            Button::A => "A",
            Button::B => "B",
            Button::Start => "START",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = String;

    /// Case-insensitive button name, with or without the `@` prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim_start_matches('@').to_ascii_uppercase();
        Button::from_handler_name(&format!("@{name}")).ok_or_else(|| format!("unknown button '{s}'"))
    }
}

/// Errors raised while running a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The current state was never defined
    UnknownState(String),
    /// A `display` statement names a shape that was never defined
    UnknownShape(String),
    Evaluation(EvalError),
}

impl From<EvalError> for RuntimeError {
    fn from(err: EvalError) -> Self {
        RuntimeError::Evaluation(err)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnknownState(name) => write!(f, "State {name} is not defined"),
            RuntimeError::UnknownShape(name) => write!(f, "Shape {name} is not defined"),
            RuntimeError::Evaluation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RuntimeError {}
