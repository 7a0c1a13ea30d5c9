//! This crate provides an interpreter for Turing machines written as standard descriptions:
//! `;` separated rules of the form `state-read-write-move-next`.
//!
//! It includes modules for parsing descriptions, running them on a tape that grows on demand,
//! encoding every rule as a run-length genome, analyzing descriptions for common mistakes,
//! and producing read-only snapshots for display front ends.

pub mod analyzer;
pub mod encoder;
pub mod loader;
pub mod machine;
pub mod palette;
pub mod parser;
pub mod programs;
pub mod symbol;
pub mod table;
pub mod tape;
pub mod types;
pub mod view;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` and `diagnose` functions and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, diagnose, AnalysisError};
/// Re-exports the genome encoding functions from the encoder module.
pub use encoder::{decode, encode, Codon, Gene};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
pub use palette::Color;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use symbol::Symbol;
pub use table::TransitionTable;
pub use tape::{Mark, Tape};
/// Re-exports various types related to description parsing and execution from the types module.
pub use types::{
    Direction, MachineConfig, Program, Step, Transition, TuringMachineError, HALT_STATE,
};
pub use view::{DisplayOptions, Snapshot};
