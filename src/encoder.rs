//! This module provides the genome encodings of transitions: run-length codes of a rule's
//! state, symbol and direction indices, written with the letters `D`, `C`, `A`, `R`, `L`
//! and `N`.
//!
//! A rule in state `q`, reading `s`, writing `w`, moving `d` and continuing in `q'` becomes
//!
//! ```text
//! D C^q  D A^s  D A^w  d  D C^q'
//! ```
//!
//! The encodings describe a machine; they are never consulted while it runs.

use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::Chars;

use crate::symbol::Symbol;
use crate::types::{Direction, TuringMachineError};

/// All genome encodings of one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    /// `D` followed by one `C` per state index.
    pub q: String,
    /// `D` followed by one `A` per read-symbol index.
    pub read: String,
    /// `D` followed by one `A` per write-symbol index.
    pub write: String,
    /// `R`, `L` or `N`.
    pub mv: String,
    /// `D` followed by one `C` per next-state index.
    pub next: String,
    /// `q + read + write + mv + next`.
    pub sd: String,
    /// `q + read`, the compact grouping key of the rule.
    pub sig: String,
    /// `sd` with every letter replaced by its digit.
    pub num: String,
}

impl Gene {
    /// The part of the gene describing what the rule does: `write + mv + next`.
    pub fn action(&self) -> String {
        format!("{}{}{}", self.write, self.mv, self.next)
    }
}

/// Indices recovered from an `sd` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codon {
    pub state: usize,
    pub read: Symbol,
    pub write: Symbol,
    pub direction: Direction,
    pub next_state: usize,
}

/// Builds the gene of a transition from its indices.
pub fn encode(
    state_index: usize,
    read: Symbol,
    write: Symbol,
    direction: Direction,
    next_index: usize,
) -> Gene {
    let q = run('C', state_index);
    let read = run('A', read.index());
    let write = run('A', write.index());
    let mv = direction.as_char().to_string();
    let next = run('C', next_index);

    let sd = format!("{q}{read}{write}{mv}{next}");
    let sig = format!("{q}{read}");
    let num = sd.chars().filter_map(digit).collect();

    Gene {
        q,
        read,
        write,
        mv,
        next,
        sd,
        sig,
        num,
    }
}

/// `D` followed by `count` copies of `letter`.
fn run(letter: char, count: usize) -> String {
    std::iter::once('D')
        .chain(std::iter::repeat(letter).take(count))
        .collect()
}

fn digit(letter: char) -> Option<char> {
    match letter {
        'D' => Some('1'),
        'C' => Some('2'),
        'A' => Some('3'),
        'R' => Some('4'),
        'L' => Some('5'),
        'N' => Some('6'),
        _ => None,
    }
}

fn letter(digit: char) -> Option<char> {
    match digit {
        '1' => Some('D'),
        '2' => Some('C'),
        '3' => Some('A'),
        '4' => Some('R'),
        '5' => Some('L'),
        '6' => Some('N'),
        _ => None,
    }
}

/// Converts an `sd` string into its digit form.
pub fn to_numeric(sd: &str) -> Result<String, TuringMachineError> {
    sd.chars()
        .map(|c| {
            digit(c).ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Invalid genome letter '{c}'"))
            })
        })
        .collect()
}

/// Converts a digit string back into its `sd` form.
pub fn from_numeric(num: &str) -> Result<String, TuringMachineError> {
    num.chars()
        .map(|c| {
            letter(c).ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Invalid genome digit '{c}'"))
            })
        })
        .collect()
}

/// Decodes a single-rule `sd` string back into its indices.
///
/// # Returns
///
/// * `Ok(Codon)` if `sd` has the shape `DC*DA*DA*[RLN]DC*` and both symbol indices exist.
/// * `Err(TuringMachineError::ValidationError)` otherwise.
pub fn decode(sd: &str) -> Result<Codon, TuringMachineError> {
    let invalid = || TuringMachineError::ValidationError(format!("Invalid gene: {sd}"));
    let mut chars = sd.chars().peekable();

    let state = count_run(&mut chars, 'C').ok_or_else(invalid)?;
    let read = count_run(&mut chars, 'A').ok_or_else(invalid)?;
    let write = count_run(&mut chars, 'A').ok_or_else(invalid)?;

    let direction = match chars.next() {
        Some('R') => Direction::Right,
        Some('L') => Direction::Left,
        Some('N') => Direction::Stay,
        _ => return Err(invalid()),
    };

    let next_state = count_run(&mut chars, 'C').ok_or_else(invalid)?;
    if chars.next().is_some() {
        return Err(invalid());
    }

    Ok(Codon {
        state,
        read: Symbol::from_index(read).ok_or_else(invalid)?,
        write: Symbol::from_index(write).ok_or_else(invalid)?,
        direction,
        next_state,
    })
}

/// Consumes a `D` followed by a run of `letter`, returning the run length.
fn count_run(chars: &mut Peekable<Chars<'_>>, letter: char) -> Option<usize> {
    if chars.next() != Some('D') {
        return None;
    }
    let mut count = 0;
    while chars.next_if_eq(&letter).is_some() {
        count += 1;
    }
    Some(count)
}
