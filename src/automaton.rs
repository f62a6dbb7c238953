//! Automaton builder
//!
//! Compiles a [`Grammar`] and a start symbol into the action/goto tables driven by
//! [`crate::parsing::Parser`].
//!
//! The construction is LR(0) with row-wide reduces:
//! 1. Productions are numbered breadth-first from the start symbol (rule 0 is the first
//!    alternative of the start symbol)
//! 2. The root state is the closure of the initial item of rule 0
//! 3. States are discovered breadth-first; advancing every unfinished item over its next symbol
//!    and unioning the closures that share that symbol gives the transition targets
//! 4. Terminal transitions become shifts, nonterminal transitions gotos and end-marker
//!    transitions accepts
//! 5. Every finished item registers a reduce for its whole state row
//!
//! No augmentation step is performed: the start production must end with the end-marker
//! symbol itself. Any cell conflict aborts the build.

mod item;
mod tables;


pub use item::{Item, ItemSet, ProductionRule};
pub use tables::{Action, ActionTable, Conflict, GotoTable};

use crate::grammar::{Grammar, GrammarError, Symbol};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

impl From<Conflict> for GrammarError {
    fn from(conflict: Conflict) -> Self {
        GrammarError::IllFormed(conflict)
    }
}

/// Everything the table-driven parser needs
#[derive(Debug, Clone, Serialize)]
pub struct ParseTables {
    start: String,
    productions: Vec<ProductionRule>,
    #[serde(skip)]
    states: Vec<ItemSet>,
    actions: ActionTable,
    gotos: GotoTable,
}

impl ParseTables {
    /// Build the automaton for `grammar` rooted at `start`
    pub fn build(grammar: &Grammar, start: &str) -> Result<Self, GrammarError> {
        let productions = normalize(grammar, start)?;
        let mut builder = Builder::new(productions);
        builder.populate()?;
        builder.register_reduces()?;

        log::debug!(
            "built automaton for '{}': {} productions, {} states",
            start,
            builder.productions.len(),
            builder.states.len()
        );

        Ok(Self {
            start: start.to_string(),
            productions: builder.productions,
            states: builder.states.into_keys().collect(),
            actions: builder.actions,
            gotos: builder.gotos,
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn productions(&self) -> &[ProductionRule] {
        &self.productions
    }

    pub fn production(&self, rule: usize) -> Option<&ProductionRule> {
        self.productions.get(rule)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Item set of a state, in discovery order
    pub fn item_set(&self, state: usize) -> Option<&ItemSet> {
        self.states.get(state)
    }

    pub fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        self.actions.action(state, terminal)
    }

    pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.gotos.goto(state, nonterminal)
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn gotos(&self) -> &GotoTable {
        &self.gotos
    }
}

/// Breadth-first walk from `start`, numbering every production in visitation order
fn normalize(grammar: &Grammar, start: &str) -> Result<Vec<ProductionRule>, GrammarError> {
    let mut productions = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([start.to_string()]);

    while let Some(lhs) = queue.pop_front() {
        if visited.contains(&lhs) {
            continue;
        }
        for rhs in grammar.rhs(&lhs)? {
            for symbol in rhs.symbols() {
                if let Symbol::NonTerminal(name) = symbol {
                    if !visited.contains(name) {
                        queue.push_back(name.clone());
                    }
                }
            }
            productions.push(ProductionRule::new(lhs.clone(), rhs.clone()));
        }
        visited.insert(lhs);
    }

    if productions.is_empty() {
        return Err(GrammarError::NoProductions(start.to_string()));
    }
    Ok(productions)
}

struct Builder {
    productions: Vec<ProductionRule>,
    by_lhs: HashMap<String, Vec<usize>>,
    states: IndexMap<ItemSet, usize>,
    actions: ActionTable,
    gotos: GotoTable,
}

impl Builder {
    fn new(productions: Vec<ProductionRule>) -> Self {
        let mut by_lhs: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, rule) in productions.iter().enumerate() {
            by_lhs.entry(rule.lhs.clone()).or_default().push(index);
        }
        Self {
            productions,
            by_lhs,
            states: IndexMap::new(),
            actions: ActionTable::new(),
            gotos: GotoTable::new(),
        }
    }

    /// `kernel` plus, when its next symbol is a nonterminal, the initial items of everything
    /// reachable through leading nonterminals
    fn closure(&self, kernel: Item) -> ItemSet {
        let mut items = ItemSet::new();
        let mut queue = VecDeque::new();
        if let Some(Symbol::NonTerminal(name)) = kernel.next_symbol() {
            queue.push_back(name.clone());
        }
        items.insert(kernel);

        let mut visited = HashSet::new();
        while let Some(lhs) = queue.pop_front() {
            if !visited.insert(lhs.clone()) {
                continue;
            }
            for &index in self.by_lhs.get(&lhs).into_iter().flatten() {
                let item = Item::initial(&self.productions[index]);
                if let Some(Symbol::NonTerminal(next)) = item.next_symbol() {
                    if !visited.contains(next) {
                        queue.push_back(next.clone());
                    }
                }
                items.insert(item);
            }
        }
        items
    }

    /// Target item set for every symbol some unfinished item can advance over
    fn transitions(&self, item_set: &ItemSet) -> IndexMap<Symbol, ItemSet> {
        let mut transitions: IndexMap<Symbol, ItemSet> = IndexMap::new();
        for item in item_set.iter() {
            if let Some(symbol) = item.next_symbol() {
                let target = self.closure(item.advanced());
                transitions
                    .entry(symbol.clone())
                    .or_default()
                    .union_with(target);
            }
        }
        transitions
    }

    /// State id of `item_set`, assigning the next id on first sight
    fn state_of(&mut self, item_set: ItemSet) -> usize {
        let next = self.states.len();
        *self.states.entry(item_set).or_insert(next)
    }

    fn populate(&mut self) -> Result<(), GrammarError> {
        let root = self.closure(Item::initial(&self.productions[0]));
        let root = self.state_of(root);

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(state) = queue.pop_front() {
            if !visited.insert(state) {
                continue;
            }
            let Some(item_set) = self.states.get_index(state).map(|(set, _)| set.clone()) else {
                continue;
            };
            let transitions = self.transitions(&item_set);

            for (symbol, target) in transitions {
                if symbol.is_end_marker() {
                    self.actions.add_accept(state, symbol.name())?;
                    continue;
                }
                let to = self.state_of(target);
                if !visited.contains(&to) {
                    queue.push_back(to);
                }
                match &symbol {
                    Symbol::Terminal(name) => self.actions.add_shift(state, name, to)?,
                    Symbol::NonTerminal(name) => self.gotos.add_goto(state, name, to),
                }
            }
        }
        Ok(())
    }

    fn register_reduces(&mut self) -> Result<(), GrammarError> {
        let numbering: HashMap<&ProductionRule, usize> = self
            .productions
            .iter()
            .enumerate()
            .map(|(index, rule)| (rule, index))
            .collect();

        for (item_set, &state) in &self.states {
            for item in item_set.iter().filter(|item| item.is_finished()) {
                if let Some(&rule) = numbering.get(&item.production()) {
                    self.actions.add_reduce(state, rule)?;
                }
            }
        }
        Ok(())
    }
}
