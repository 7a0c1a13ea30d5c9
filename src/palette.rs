//! Colours attached to transitions and tape cells. Purely presentational: nothing in the
//! execution path reads them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGB colour, serialised as `#RRGGBB`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Colour of a point on the red-to-magenta hue sweep, `t` in `0.0..=1.0`.
    pub fn from_hue_fraction(t: f64) -> Self {
        let h = t.clamp(0.0, 1.0) * 300.0 / 60.0;
        let sector = h.floor() as u8;
        let f = h - h.floor();
        let up = (255.0 * f) as u8;
        let down = (255.0 * (1.0 - f)) as u8;

        match sector {
            0 => Self::new(255, up, 0),
            1 => Self::new(down, 255, 0),
            2 => Self::new(0, 255, up),
            3 => Self::new(0, down, 255),
            4 => Self::new(up, 0, 255),
            _ => Self::new(255, 0, 255),
        }
    }
}

/// `n` colours evenly spread over the hue sweep. A single colour is pure red.
pub fn spectrum(n: usize) -> Vec<Color> {
    (0..n)
        .map(|i| {
            let t = if n == 1 {
                0.0
            } else {
                i as f64 / (n - 1) as f64
            };
            Color::from_hue_fraction(t)
        })
        .collect()
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| format!("Invalid colour: {s}"))?;

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| format!("Invalid colour: {s}"))
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
