//! This module provides the `ProgramLoader` struct, responsible for loading standard
//! descriptions and machine configurations from files, directories and strings.

use crate::parser::parse;
use crate::types::{MachineConfig, Program, TuringMachineError};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions recognised as standard descriptions.
pub const DESCRIPTION_EXTENSIONS: [&str; 2] = ["sd", "tm"];

/// `ProgramLoader` is a utility struct for loading descriptions and configurations.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single description from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * Any parse error of the file content otherwise.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        debug!("Loading description from {}", path.display());
        let content = read(path)?;
        parse(&content)
    }

    /// Parses a description held in memory, e.g. read from standard input.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        parse(content)
    }

    /// Loads every description file (`.sd` or `.tm`) found directly in `directory`.
    ///
    /// Directories and files with other extensions are skipped. Each element of the result
    /// is either the path and program of a file that parsed, or the error of one that did not.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut unreadable: Vec<Result<(PathBuf, Program), TuringMachineError>> = Vec::new();
        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => unreadable.push(Err(TuringMachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        // read_dir order is platform dependent
        paths.retain(|path| !path.is_dir() && is_description(path));
        paths.sort();

        let loaded = paths.into_iter().map(|path| match Self::load_program(&path) {
            Ok(program) => Ok((path, program)),
            Err(e) => Err(TuringMachineError::FileError(format!(
                "Failed to load program from {}: {}",
                path.display(),
                e
            ))),
        });

        // unreadable entries have no path and go last
        loaded.chain(unreadable).collect()
    }

    /// Loads a JSON machine configuration. Missing fields keep their defaults.
    pub fn load_config(path: &Path) -> Result<MachineConfig, TuringMachineError> {
        debug!("Loading configuration from {}", path.display());
        MachineConfig::from_json(&read(path)?)
    }
}

fn read(path: &Path) -> Result<String, TuringMachineError> {
    fs::read_to_string(path).map_err(|e| {
        TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}

fn is_description(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DESCRIPTION_EXTENSIONS.contains(&ext))
}
