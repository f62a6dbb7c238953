//! LR(0) items and item sets
//!
//! Items and item sets are compared and hashed by value so that an [`ItemSet`] can key the
//! state map directly: two item sets reached along different paths collapse into one state.

use crate::grammar::{Rhs, Symbol};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A numbered `lhs := rhs` pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProductionRule {
    pub lhs: String,
    pub rhs: Rhs,
}

impl ProductionRule {
    pub fn new(lhs: impl Into<String>, rhs: Rhs) -> Self {
        Self {
            lhs: lhs.into(),
            rhs,
        }
    }
}

impl fmt::Display for ProductionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.lhs, self.rhs)
    }
}

/// A production with a cursor marking how much of the right-hand side has been matched
///
/// The cursor is clamped to the right-hand side length on construction, so equality always
/// compares effective cursors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    lhs: String,
    rhs: Rhs,
    cursor: usize,
}

impl Item {
    pub fn new(lhs: impl Into<String>, rhs: Rhs, cursor: usize) -> Self {
        let cursor = cursor.min(rhs.len());
        Self {
            lhs: lhs.into(),
            rhs,
            cursor,
        }
    }

    /// The item with the cursor before the first symbol of `rule`
    pub fn initial(rule: &ProductionRule) -> Self {
        Self::new(rule.lhs.clone(), rule.rhs.clone(), 0)
    }

    pub fn lhs(&self) -> &str {
        &self.lhs
    }

    pub fn rhs(&self) -> &Rhs {
        &self.rhs
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor == self.rhs.len()
    }

    /// Symbol right after the cursor, `None` for finished items
    pub fn next_symbol(&self) -> Option<&Symbol> {
        self.rhs.get(self.cursor)
    }

    /// The same item with the cursor moved one symbol to the right
    pub fn advanced(&self) -> Self {
        Self::new(self.lhs.clone(), self.rhs.clone(), self.cursor + 1)
    }

    pub fn production(&self) -> ProductionRule {
        ProductionRule::new(self.lhs.clone(), self.rhs.clone())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :=", self.lhs)?;
        for (i, symbol) in self.rhs.symbols().iter().enumerate() {
            if i == self.cursor {
                f.write_str(" •")?;
            }
            write!(f, " {symbol}")?;
        }
        if self.is_finished() {
            f.write_str(" •")?;
        }
        Ok(())
    }
}

/// A value-equal set of items; one item set is one automaton state
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemSet(BTreeSet<Item>);

impl ItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: Item) -> bool {
        self.0.insert(item)
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.0.contains(item)
    }

    /// Add every item of `other`
    pub fn union_with(&mut self, other: ItemSet) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Item> for ItemSet {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ItemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
