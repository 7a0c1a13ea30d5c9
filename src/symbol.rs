//! This module defines the closed tape alphabet used by standard descriptions.
//!
//! Every symbol has three fixed faces: the token used in description files (`S_`, `S0`, ...),
//! the single character printed on the tape, and an ordinal index. The ordinal index drives the
//! length of the genome encodings, so the table below must never be reordered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::TuringMachineError;

/// A tape symbol from the fixed standard-description alphabet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    /// The blank cell, written `S_`.
    #[default]
    Blank,
    /// The digit `0`, written `S0`.
    Zero,
    /// The digit `1`, written `S1`.
    One,
    /// Right-direction marker, written `R`.
    R,
    /// Left-direction marker, written `L`.
    L,
    /// No-move marker, written `N`.
    N,
    /// Sentinel, written `SENTINEL` and printed as `@`.
    Sentinel,
    X,
    Y,
    Z,
    /// Asterisk marker, written `*`.
    Star,
    Q,
    A,
    S,
    T,
    U,
    V,
}

impl Symbol {
    /// All symbols in ordinal order.
    pub const ALL: [Symbol; 17] = [
        Symbol::Blank,
        Symbol::Zero,
        Symbol::One,
        Symbol::R,
        Symbol::L,
        Symbol::N,
        Symbol::Sentinel,
        Symbol::X,
        Symbol::Y,
        Symbol::Z,
        Symbol::Star,
        Symbol::Q,
        Symbol::A,
        Symbol::S,
        Symbol::T,
        Symbol::U,
        Symbol::V,
    ];

    /// Looks up a symbol by its description token.
    pub fn from_token(token: &str) -> Result<Self, TuringMachineError> {
        let symbol = match token {
            "S_" => Symbol::Blank,
            "S0" => Symbol::Zero,
            "S1" => Symbol::One,
            "R" => Symbol::R,
            "L" => Symbol::L,
            "N" => Symbol::N,
            "SENTINEL" => Symbol::Sentinel,
            "X" => Symbol::X,
            "Y" => Symbol::Y,
            "Z" => Symbol::Z,
            "*" => Symbol::Star,
            "Q" => Symbol::Q,
            "A" => Symbol::A,
            "S" => Symbol::S,
            "T" => Symbol::T,
            "U" => Symbol::U,
            "V" => Symbol::V,
            _ => return Err(TuringMachineError::UnknownSymbol(token.to_string())),
        };

        Ok(symbol)
    }

    /// Returns the token this symbol is written as in a description.
    pub fn token(self) -> &'static str {
        match self {
            Symbol::Blank => "S_",
            Symbol::Zero => "S0",
            Symbol::One => "S1",
            Symbol::R => "R",
            Symbol::L => "L",
            Symbol::N => "N",
            Symbol::Sentinel => "SENTINEL",
            Symbol::X => "X",
            Symbol::Y => "Y",
            Symbol::Z => "Z",
            Symbol::Star => "*",
            Symbol::Q => "Q",
            Symbol::A => "A",
            Symbol::S => "S",
            Symbol::T => "T",
            Symbol::U => "U",
            Symbol::V => "V",
        }
    }

    /// Returns the character printed on the tape for this symbol.
    pub fn as_char(self) -> char {
        match self {
            Symbol::Blank => ' ',
            Symbol::Zero => '0',
            Symbol::One => '1',
            Symbol::R => 'R',
            Symbol::L => 'L',
            Symbol::N => 'N',
            Symbol::Sentinel => '@',
            Symbol::X => 'X',
            Symbol::Y => 'Y',
            Symbol::Z => 'Z',
            Symbol::Star => '*',
            Symbol::Q => 'Q',
            Symbol::A => 'A',
            Symbol::S => 'S',
            Symbol::T => 'T',
            Symbol::U => 'U',
            Symbol::V => 'V',
        }
    }

    /// Returns the ordinal index used by the genome encodings.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the symbol with the given ordinal index, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl FromStr for Symbol {
    type Err = TuringMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
