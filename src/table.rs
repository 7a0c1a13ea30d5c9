//! This module provides the `TransitionTable`, the mapping from (state, read symbol) to the
//! transition the machine applies.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::symbol::Symbol;
use crate::types::Transition;

/// Transition rules in definition order, indexed by state and read symbol.
///
/// At most one transition exists per (state, symbol) pair. Inserting a second one replaces
/// the first in place, so the definition order of the pair is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Transition>", into = "Vec<Transition>")]
pub struct TransitionTable {
    transitions: Vec<Transition>,
    index: HashMap<String, HashMap<Symbol, usize>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a transition, returning the one it replaced, if any.
    pub fn insert(&mut self, transition: Transition) -> Option<Transition> {
        let symbols = self.index.entry(transition.state.clone()).or_default();

        match symbols.get(&transition.read) {
            Some(&position) => Some(std::mem::replace(
                &mut self.transitions[position],
                transition,
            )),
            None => {
                symbols.insert(transition.read, self.transitions.len());
                self.transitions.push(transition);
                None
            }
        }
    }

    /// Finds the transition for `state` reading `symbol`.
    pub fn get(&self, state: &str, symbol: Symbol) -> Option<&Transition> {
        self.position(state, symbol).map(|i| &self.transitions[i])
    }

    /// Position of the transition for `state` reading `symbol` in definition order.
    pub fn position(&self, state: &str, symbol: Symbol) -> Option<usize> {
        self.index
            .get(state)
            .and_then(|symbols| symbols.get(&symbol))
            .copied()
    }

    /// All transitions leaving `state`, in definition order.
    pub fn rules_for<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions.iter().filter(move |t| t.state == state)
    }

    /// Checks if `state` has at least one outgoing transition.
    pub fn contains_state(&self, state: &str) -> bool {
        self.index.contains_key(state)
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Derived fields only; changing `state` or `read` through this would desync the index.
    pub(crate) fn transitions_mut(&mut self) -> &mut [Transition] {
        &mut self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

impl From<Vec<Transition>> for TransitionTable {
    fn from(transitions: Vec<Transition>) -> Self {
        let mut table = Self::new();
        for transition in transitions {
            table.insert(transition);
        }
        table
    }
}

impl From<TransitionTable> for Vec<Transition> {
    fn from(table: TransitionTable) -> Self {
        table.transitions
    }
}
