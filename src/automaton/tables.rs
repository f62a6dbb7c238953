//! Action and goto tables
//!
//! Reduce actions are row-wide: a state holds at most one reduce, and it applies to every
//! terminal column of that row. Registering any action that competes with an existing one is a
//! [`Conflict`], there is no resolution policy.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A parser action for one `(state, terminal)` cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "lowercase")]
pub enum Action {
    /// Consume the token and move to the given state
    Shift(usize),
    /// Collapse the right-hand side of the given production
    Reduce(usize),
    /// Input is complete
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{state}"),
            Action::Reduce(rule) => write!(f, "r{rule}"),
            Action::Accept => f.write_str("acc"),
        }
    }
}

/// Two actions competing for the same cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    ShiftShift { state: usize, terminal: String },
    ShiftReduce { state: usize, terminal: String },
    ShiftAccept { state: usize, terminal: String },
    ReduceReduce { state: usize },
    ReduceAccept { state: usize, terminal: String },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::ShiftShift { state, terminal } => {
                write!(f, "shift-shift conflict at state {state} and terminal '{terminal}'")
            }
            Conflict::ShiftReduce { state, terminal } => {
                write!(f, "shift-reduce conflict at state {state} and terminal '{terminal}'")
            }
            Conflict::ShiftAccept { state, terminal } => {
                write!(f, "shift-accept conflict at state {state} and terminal '{terminal}'")
            }
            Conflict::ReduceReduce { state } => {
                write!(f, "reduce-reduce conflict at state {state} and all terminals")
            }
            Conflict::ReduceAccept { state, terminal } => {
                write!(f, "reduce-accept conflict at state {state} and terminal '{terminal}'")
            }
        }
    }
}

/// Shift, reduce and accept entries, kept apart so conflicts are cheap to detect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionTable {
    shifts: BTreeMap<usize, BTreeMap<String, usize>>,
    reduces: BTreeMap<usize, usize>,
    accepts: BTreeMap<usize, BTreeSet<String>>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn shift_at(&self, state: usize, terminal: &str) -> Option<usize> {
        self.shifts.get(&state)?.get(terminal).copied()
    }

    fn accepts_at(&self, state: usize, terminal: &str) -> bool {
        self.accepts
            .get(&state)
            .is_some_and(|terminals| terminals.contains(terminal))
    }

    pub fn add_shift(&mut self, state: usize, terminal: &str, to: usize) -> Result<(), Conflict> {
        match self.shift_at(state, terminal) {
            Some(existing) if existing != to => {
                return Err(Conflict::ShiftShift {
                    state,
                    terminal: terminal.to_string(),
                })
            }
            Some(_) => return Ok(()),
            None => {}
        }
        if self.reduces.contains_key(&state) {
            return Err(Conflict::ShiftReduce {
                state,
                terminal: terminal.to_string(),
            });
        }
        if self.accepts_at(state, terminal) {
            return Err(Conflict::ShiftAccept {
                state,
                terminal: terminal.to_string(),
            });
        }
        self.shifts
            .entry(state)
            .or_default()
            .insert(terminal.to_string(), to);
        Ok(())
    }

    /// Register a row-wide reduce for `state`
    pub fn add_reduce(&mut self, state: usize, rule: usize) -> Result<(), Conflict> {
        match self.reduces.get(&state) {
            Some(existing) if *existing != rule => return Err(Conflict::ReduceReduce { state }),
            Some(_) => return Ok(()),
            None => {}
        }
        if let Some(terminal) = self.shifts.get(&state).and_then(|row| row.keys().next()) {
            return Err(Conflict::ShiftReduce {
                state,
                terminal: terminal.clone(),
            });
        }
        if let Some(terminal) = self.accepts.get(&state).and_then(|row| row.iter().next()) {
            return Err(Conflict::ReduceAccept {
                state,
                terminal: terminal.clone(),
            });
        }
        self.reduces.insert(state, rule);
        Ok(())
    }

    pub fn add_accept(&mut self, state: usize, terminal: &str) -> Result<(), Conflict> {
        if self.shift_at(state, terminal).is_some() {
            return Err(Conflict::ShiftAccept {
                state,
                terminal: terminal.to_string(),
            });
        }
        if self.reduces.contains_key(&state) {
            return Err(Conflict::ReduceAccept {
                state,
                terminal: terminal.to_string(),
            });
        }
        self.accepts
            .entry(state)
            .or_default()
            .insert(terminal.to_string());
        Ok(())
    }

    /// The action for a cell, if any
    pub fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        if self.accepts_at(state, terminal) {
            return Some(Action::Accept);
        }
        if let Some(to) = self.shift_at(state, terminal) {
            return Some(Action::Shift(to));
        }
        self.reduces.get(&state).map(|rule| Action::Reduce(*rule))
    }

    /// The row-wide reduce of `state`
    pub fn reduce_in_row(&self, state: usize) -> Option<usize> {
        self.reduces.get(&state).copied()
    }
}

/// `(state, nonterminal) -> state` transitions taken after a reduction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GotoTable(BTreeMap<usize, BTreeMap<String, usize>>);

impl GotoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_goto(&mut self, state: usize, nonterminal: &str, to: usize) {
        self.0
            .entry(state)
            .or_default()
            .insert(nonterminal.to_string(), to);
    }

    pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.0.get(&state)?.get(nonterminal).copied()
    }
}
