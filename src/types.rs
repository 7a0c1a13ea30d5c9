//! This module defines the core data structures and types used throughout the interpreter,
//! including program representation, transitions, execution results, configuration and
//! error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoder::Gene;
use crate::palette::Color;
use crate::symbol::Symbol;
use crate::table::TransitionTable;
use crate::Rule;

/// The state name that terminates execution.
pub const HALT_STATE: &str = "HALT";
/// Marker separating a free-form preamble from the rules of a description.
pub const PREAMBLE_MARKER: &str = "#########";
/// Number of cells added whenever the head walks off either end of the tape.
pub const TAPE_CHUNK: usize = 10;
/// Number of cells on a freshly created tape.
pub const DEFAULT_TAPE_SIZE: usize = 54;
/// Tape size at which an unfinished run is aborted.
pub const DEFAULT_MAX_TAPE_SIZE: usize = 999;
/// Default time budget of one step for the time-gated `update`.
pub const DEFAULT_STEP_DURATION_MS: u64 = 999;
/// The maximum number of steps `run` executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// A parsed standard description: the transition table plus the state bookkeeping the
/// parser assigns while reading it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// First non-empty line of the preamble, if the description carried one.
    pub title: Option<String>,
    /// The first state named in the description. `None` for an empty description.
    pub initial_state: Option<String>,
    /// Distinct source states in first-seen order; the position is the state index.
    pub states: Vec<String>,
    /// The transition table, keyed by (state, read symbol).
    pub table: TransitionTable,
}

impl Program {
    /// Returns the index the parser assigned to `state`, if it is a source state.
    pub fn state_index(&self, state: &str) -> Option<usize> {
        self.states.iter().position(|s| s == state)
    }

    /// Returns all live transitions in definition order.
    pub fn transitions(&self) -> &[Transition] {
        self.table.transitions()
    }

    /// Checks if the description contained no rules at all.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Concatenation of every transition's `sd` encoding, in definition order.
    pub fn genome(&self) -> String {
        self.transitions().iter().map(|t| t.gene.sd.as_str()).collect()
    }

    /// Number of nucleotides in `genome`, without building it.
    pub fn genome_len(&self) -> usize {
        self.transitions().iter().map(|t| t.gene.sd.len()).sum()
    }

    /// Number of genes, one per live transition.
    pub fn gene_count(&self) -> usize {
        self.table.len()
    }
}

/// One rule of the machine: in `state`, reading `read`, write `write`, move `direction`
/// and continue in `next_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub state: String,
    /// Index of `state` in first-seen order.
    pub state_index: usize,
    pub read: Symbol,
    pub write: Symbol,
    pub direction: Direction,
    pub next_state: String,
    /// `next_state{'c'}` where `c` is the printed form of `read`. Grouping key, not an identity.
    pub signature: String,
    /// Genome encodings, filled in by the parser.
    pub gene: Gene,
    /// Display colour, assigned once the number of states is known.
    pub color: Color,
}

impl Transition {
    /// Creates a transition with an empty gene and the default colour.
    pub fn new(
        state: impl Into<String>,
        state_index: usize,
        read: Symbol,
        write: Symbol,
        direction: Direction,
        next_state: impl Into<String>,
    ) -> Self {
        let next_state = next_state.into();
        let signature = format!("{}{{'{}'}}", next_state, read.as_char());

        Self {
            state: state.into(),
            state_index,
            read,
            write,
            direction,
            next_state,
            signature,
            gene: Gene::default(),
            color: Color::default(),
        }
    }

    /// Index-based signature, e.g. `Q0{'S2'}`.
    pub fn index_signature(&self) -> String {
        format!("Q{}{{'S{}'}}", self.state_index, self.read.index())
    }

    /// Checks if this transition moves the machine into the halting state.
    pub fn is_halting(&self) -> bool {
        self.next_state == HALT_STATE
    }
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Reads a direction token. Anything other than `R` or `L` means no move.
    pub fn from_token(token: &str) -> Self {
        match token {
            "R" => Direction::Right,
            "L" => Direction::Left,
            _ => Direction::Stay,
        }
    }

    /// The letter used for this direction in the genome encoding.
    pub fn as_char(self) -> char {
        match self {
            Direction::Right => 'R',
            Direction::Left => 'L',
            Direction::Stay => 'N',
        }
    }
}

/// Represents the outcome of a Turing Machine execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and can continue.
    Continue,
    /// The machine is in the `HALT` state.
    Halt,
}

/// Tunables of a running machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Tape size at which `step` refuses to continue. `None` disables the ceiling.
    pub max_tape_size: Option<usize>,
    /// Step budget for `run`. `None` runs until halt or error.
    pub max_steps: Option<usize>,
    /// Accumulated time after which `update` performs a step.
    pub step_duration_ms: u64,
    /// Number of cells on a fresh tape.
    pub tape_size: usize,
    /// Symbol used for fresh cells and for growth chunks.
    pub fill: Symbol,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_tape_size: Some(DEFAULT_MAX_TAPE_SIZE),
            max_steps: Some(MAX_EXECUTION_STEPS),
            step_duration_ms: DEFAULT_STEP_DURATION_MS,
            tape_size: DEFAULT_TAPE_SIZE,
            fill: Symbol::Blank,
        }
    }
}

impl MachineConfig {
    /// Parses a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(input: &str) -> Result<Self, TuringMachineError> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| TuringMachineError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the tape cannot honour.
    pub fn validate(&self) -> Result<(), TuringMachineError> {
        if self.tape_size == 0 {
            return Err(TuringMachineError::ConfigError(
                "tape_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// A configuration without tape ceiling or step budget, for batch runs.
    pub fn unbounded() -> Self {
        Self {
            max_tape_size: None,
            max_steps: None,
            ..Self::default()
        }
    }
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// A rule did not split into exactly five `-` separated fields.
    #[error("Malformed rule #{index} '{text}': expected 5 fields, found {fields}")]
    MalformedRule {
        index: usize,
        text: String,
        fields: usize,
    },
    /// A symbol token is not part of the alphabet.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
    /// Indicates that there's no rule defined for the current state and symbol.
    #[error("No rule defined for state {0} and symbol {1:?}")]
    UndefinedTransition(String, Symbol),
    /// The tape reached the configured ceiling before the machine halted.
    #[error("Tape size {size} reached the limit of {limit} cells")]
    TapeSizeExceeded { size: usize, limit: usize },
    /// The step budget of `run` was used up before the machine halted.
    #[error("Machine did not halt within {0} steps")]
    StepLimitExceeded(usize),
    /// Direct tape access outside the tape.
    #[error("Tape index {index} is out of range (tape has {len} cells)")]
    IndexOutOfRange { index: usize, len: usize },
    /// The description contained no rules.
    #[error("Program has no rules")]
    EmptyProgram,
    /// Indicates an error during the parsing of a description.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a program's structure or logic.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an invalid machine configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_tokens() {
        assert_eq!(Direction::from_token("R"), Direction::Right);
        assert_eq!(Direction::from_token("L"), Direction::Left);
        assert_eq!(Direction::from_token("N"), Direction::Stay);
        assert_eq!(Direction::from_token("anything"), Direction::Stay);
        assert_eq!(Direction::from_token("r"), Direction::Stay);
    }

    #[test]
    fn test_program_genome() {
        let program = crate::parser::parse("A-S_-S1-R-B; B-S_-S0-L-A").unwrap();

        assert_eq!(program.genome(), "DDDAARDCDCDDALD");
        assert_eq!(program.genome_len(), 15);
        assert_eq!(program.gene_count(), 2);
        assert_eq!(program.state_index("B"), Some(1));
        assert_eq!(program.state_index("HALT"), None);
    }

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(left_json, "\"Left\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_transition_signature_uses_next_state() {
        let transition = Transition::new(
            "A",
            0,
            Symbol::One,
            Symbol::Zero,
            Direction::Right,
            "B",
        );

        assert_eq!(transition.signature, "B{'1'}");
        assert_eq!(transition.index_signature(), "Q0{'S2'}");
        assert!(!transition.is_halting());
    }

    #[test]
    fn test_blank_signature() {
        let transition = Transition::new(
            "A",
            3,
            Symbol::Blank,
            Symbol::One,
            Direction::Stay,
            HALT_STATE,
        );

        assert_eq!(transition.signature, "HALT{' '}");
        assert!(transition.is_halting());
    }

    #[test]
    fn test_config_from_json() {
        let config = MachineConfig::from_json(r#"{ "max_tape_size": null, "tape_size": 8 }"#)
            .unwrap();

        assert_eq!(config.max_tape_size, None);
        assert_eq!(config.tape_size, 8);
        assert_eq!(config.step_duration_ms, DEFAULT_STEP_DURATION_MS);
        assert_eq!(config.fill, Symbol::Blank);
    }

    #[test]
    fn test_config_rejects_empty_tape() {
        let error = MachineConfig::from_json(r#"{ "tape_size": 0 }"#).unwrap_err();
        assert!(matches!(error, TuringMachineError::ConfigError(_)));

        let error = MachineConfig::from_json("not json").unwrap_err();
        assert!(matches!(error, TuringMachineError::ConfigError(_)));
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::UndefinedTransition("q0".to_string(), Symbol::One);

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("No rule defined"));
        assert!(error_msg.contains("q0"));
    }
}
