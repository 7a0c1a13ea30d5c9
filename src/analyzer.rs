//! This module provides functions for analyzing parsed descriptions to detect common mistakes
//! before execution: states that are jumped to but never defined, states that can never be
//! reached, and machines with no way to halt.
//!
//! Parsing never runs these checks. A description with such findings is still a valid
//! machine; it simply fails or loops at run time.

use crate::types::{Program, TuringMachineError, HALT_STATE};
use std::collections::{HashSet, VecDeque};

/// Represents the findings of analyzing a description.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The description has no rules and therefore no initial state.
    NoInitialState,
    /// Transitions jump to states that have no rules of their own (other than `HALT`).
    UndefinedNextStates(Vec<String>),
    /// States with rules that cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
    /// No transition leads to `HALT`.
    NoHaltTransition,
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NoInitialState => {
                TuringMachineError::ValidationError("No initial state".to_string())
            }
            AnalysisError::UndefinedNextStates(states) => TuringMachineError::ValidationError(
                format!("Transitions reference undefined states: {:?}", states),
            ),
            AnalysisError::UnreachableStates(states) => TuringMachineError::ValidationError(
                format!("Unreachable states detected: {:?}", states),
            ),
            AnalysisError::NoHaltTransition => TuringMachineError::ValidationError(format!(
                "No transition leads to {}",
                HALT_STATE
            )),
        }
    }
}

/// Analyzes a `Program`, returning the first finding as an error.
///
/// # Returns
///
/// * `Ok(())` if no issues are found.
/// * `Err(TuringMachineError::ValidationError)` describing the first issue otherwise.
pub fn analyze(program: &Program) -> Result<(), TuringMachineError> {
    match diagnose(program).into_iter().next() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Runs every check and collects all findings, in check order.
pub fn diagnose(program: &Program) -> Vec<AnalysisError> {
    [
        check_initial_state,
        check_undefined_next_states,
        check_unreachable_states,
        check_halt_transition,
    ]
    .iter()
    .filter_map(|f| f(program).err())
    .collect()
}

fn check_initial_state(program: &Program) -> Result<(), AnalysisError> {
    match program.initial_state {
        Some(_) => Ok(()),
        None => Err(AnalysisError::NoInitialState),
    }
}

/// Checks that every `next_state` is either `HALT` or has rules of its own.
fn check_undefined_next_states(program: &Program) -> Result<(), AnalysisError> {
    let mut undefined: Vec<String> = program
        .transitions()
        .iter()
        .map(|t| t.next_state.as_str())
        .filter(|next| *next != HALT_STATE && !program.table.contains_state(next))
        .collect::<HashSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();

    if undefined.is_empty() {
        return Ok(());
    }

    undefined.sort();
    Err(AnalysisError::UndefinedNextStates(undefined))
}

/// Walks the state graph from the initial state and reports states never visited.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let Some(initial) = program.initial_state.as_deref() else {
        return Ok(());
    };

    let mut reachable = HashSet::from([initial]);
    let mut queue = VecDeque::from([initial]);

    while let Some(state) = queue.pop_front() {
        for transition in program.table.rules_for(state) {
            let next = transition.next_state.as_str();
            if reachable.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let unreachable: Vec<String> = program
        .states
        .iter()
        .filter(|state| !reachable.contains(state.as_str()))
        .cloned()
        .collect();

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UnreachableStates(unreachable))
    }
}

fn check_halt_transition(program: &Program) -> Result<(), AnalysisError> {
    if program.is_empty() || program.transitions().iter().any(|t| t.is_halting()) {
        Ok(())
    } else {
        Err(AnalysisError::NoHaltTransition)
    }
}
