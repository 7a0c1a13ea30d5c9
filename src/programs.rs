use crate::types::{Program, TuringMachineError};

use log::warn;
use std::sync::{RwLock, RwLockReadGuard};

// Demo descriptions shipped with the crate
const PROGRAM_TEXTS: [&str; 3] = [
    include_str!("../demos/busy-beaver-2.sd"),
    include_str!("../demos/busy-beaver-3.sd"),
    include_str!("../demos/alternating.sd"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<Program>> = RwLock::new(parse_demos());
}

/// Parses every embedded demo, skipping (and logging) any that fail.
fn parse_demos() -> Vec<Program> {
    PROGRAM_TEXTS
        .iter()
        .enumerate()
        .filter_map(|(index, text)| match crate::parser::parse(text) {
            Ok(program) => Some(program),
            Err(e) => {
                warn!("Failed to parse demo #{index}: {e}");
                None
            }
        })
        .collect()
}

fn read_programs() -> Result<RwLockReadGuard<'static, Vec<Program>>, TuringMachineError> {
    read_lock(&PROGRAMS)
}

fn read_lock(
    lock: &RwLock<Vec<Program>>,
) -> Result<RwLockReadGuard<'_, Vec<Program>>, TuringMachineError> {
    lock.read()
        .map_err(|_| TuringMachineError::FileError("Failed to acquire read lock".to_string()))
}

pub struct ProgramManager;

impl ProgramManager {
    /// Re-parses the embedded demo descriptions into the registry, dropping any other changes.
    pub fn load() -> Result<(), TuringMachineError> {
        let programs = parse_demos();

        let mut write_guard = PROGRAMS.write().map_err(|_| {
            TuringMachineError::FileError("Failed to acquire write lock".to_string())
        })?;
        *write_guard = programs;

        Ok(())
    }

    /// Get the number of available programs
    pub fn get_program_count() -> Result<usize, TuringMachineError> {
        Ok(read_programs()?.len())
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        read_programs()?.get(index).cloned().ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its title, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        read_programs()?
            .iter()
            .find(|program| {
                program
                    .title
                    .as_deref()
                    .is_some_and(|title| title.eq_ignore_ascii_case(name))
            })
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// List all program titles
    pub fn list_program_names() -> Result<Vec<String>, TuringMachineError> {
        Ok(read_programs()?.iter().map(program_name).collect())
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program_name(&program),
            initial_state: program.initial_state.clone().unwrap_or_default(),
            state_count: program.states.len(),
            transition_count: program.table.len(),
            genome_len: program.genome_len(),
        })
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| {
            TuringMachineError::ValidationError(format!(
                "Program text index {} out of range",
                index
            ))
        })
    }
}

fn program_name(program: &Program) -> String {
    program.title.clone().unwrap_or_else(|| "untitled".to_string())
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub state_count: usize,
    pub transition_count: usize,
    /// Length of the run-length genome in nucleotides.
    pub genome_len: usize,
}
