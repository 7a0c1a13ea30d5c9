//! This module provides the parser for standard descriptions, utilizing the `pest` crate.
//! It defines the grammar for description files and functions to parse the input into a
//! `Program`.
//!
//! A description is a `;` separated list of rules, each made of five `-` separated fields:
//!
//! ```text
//! A - S_ - S1 - R - B ; B - S_ - S0 - R - A
//! ```
//!
//! Anything up to and including a `#########` marker is a free-form preamble.

use crate::{
    encoder::encode,
    palette::spectrum,
    symbol::Symbol,
    table::TransitionTable,
    types::{
        Direction, Program, Transition, TuringMachineError, PREAMBLE_MARKER,
    },
};
use log::{debug, info, warn};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the standard-description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct StandardDescriptionParser;

/// Parses the given standard description into a `Program`.
///
/// This is the main entry point for reading descriptions. The preamble is split off, tabs
/// and newlines are flattened to spaces, and every non-empty rule is registered in order.
/// A rule redefining an existing (state, symbol) pair replaces it in place and logs a warning.
///
/// # Arguments
///
/// * `input` - A string slice containing the description.
///
/// # Returns
///
/// * `Ok(Program)` if every rule is well formed. An input without rules yields an empty
///   program with no initial state.
/// * `Err(TuringMachineError::MalformedRule)` if a rule does not have exactly five fields.
/// * `Err(TuringMachineError::UnknownSymbol)` if a read or write token is not in the alphabet.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    let (title, body) = split_preamble(input);
    let body = flatten(body);

    // The grammar accepts any text; field counts and symbols are checked by the builder.
    let pairs = StandardDescriptionParser::parse(Rule::description, &body)
        .map_err(|e| TuringMachineError::ParseError(e.into()))?;

    let mut builder = ProgramBuilder::default();

    for (i, line) in pairs
        .flatten()
        .filter(|p| p.as_rule() == Rule::line)
        .enumerate()
    {
        if line.as_str().trim().is_empty() {
            continue;
        }
        builder.add(i + 1, line)?;
    }

    let program = builder.finish(title);
    info!(
        "Parsed {} rules over {} states",
        program.table.len(),
        program.states.len()
    );

    Ok(program)
}

/// Splits off everything up to and including the first preamble marker.
///
/// Returns the first non-empty preamble line as the title, and the rule text.
fn split_preamble(input: &str) -> (Option<String>, &str) {
    match input.find(PREAMBLE_MARKER) {
        Some(pos) => {
            let title = input[..pos]
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(String::from);
            (title, &input[pos + PREAMBLE_MARKER.len()..])
        }
        None => (None, input),
    }
}

/// Turns tabs and line breaks into spaces so rules may span lines.
fn flatten(body: &str) -> String {
    body.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}

/// Accumulates rules and the first-seen state order while a description is read.
#[derive(Default)]
struct ProgramBuilder {
    initial_state: Option<String>,
    states: Vec<String>,
    table: TransitionTable,
}

impl ProgramBuilder {
    /// Registers the rule in a `Pair<Rule::line>`. `index` is its 1-based position.
    fn add(&mut self, index: usize, line: Pair<Rule>) -> Result<(), TuringMachineError> {
        let text = line.as_str().trim().to_string();
        let fields: Vec<&str> = line.into_inner().map(|f| f.as_str().trim()).collect();

        let &[state, read, write, direction, next_state] = fields.as_slice() else {
            return Err(TuringMachineError::MalformedRule {
                index,
                text,
                fields: fields.len(),
            });
        };

        let read = Symbol::from_token(read)?;
        let write = Symbol::from_token(write)?;
        let direction = Direction::from_token(direction);

        if self.initial_state.is_none() {
            self.initial_state = Some(state.to_string());
        }

        let state_index = self.register_state(state);
        // States not seen as a source yet are encoded one past the last known state.
        let next_index = self
            .states
            .iter()
            .position(|s| s == next_state)
            .unwrap_or(self.states.len());

        let mut transition =
            Transition::new(state, state_index, read, write, direction, next_state);
        transition.gene = encode(state_index, read, write, direction, next_index);

        debug!(
            "Rule #{index}: {state} {} -> {} {:?} {next_state} ({})",
            read.token(),
            write.token(),
            direction,
            transition.gene.sd
        );

        if let Some(previous) = self.table.insert(transition) {
            warn!(
                "Rule #{index} redefines {} reading {}; the earlier rule is discarded",
                previous.state,
                previous.read.token()
            );
        }

        Ok(())
    }

    /// Returns the index of `state`, assigning the next free one on first sight.
    fn register_state(&mut self, state: &str) -> usize {
        match self.states.iter().position(|s| s == state) {
            Some(index) => index,
            None => {
                self.states.push(state.to_string());
                self.states.len() - 1
            }
        }
    }

    /// Assigns colours by state index now that the number of states is known.
    fn finish(mut self, title: Option<String>) -> Program {
        let colors = spectrum(self.states.len());
        for transition in self.table.transitions_mut() {
            transition.color = colors[transition.state_index];
        }

        Program {
            title,
            initial_state: self.initial_state,
            states: self.states,
            table: self.table,
        }
    }
}
