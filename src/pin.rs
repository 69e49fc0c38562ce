use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Kernel-global GPIO number, as accepted by `<root>/export`.
pub type PinNumber = u32;

#[derive(Debug, Hash, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Hash, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    Low,
    High,
}

/// Transitions an input pin reports to a poller of its value file.
#[derive(Debug, Hash, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeTrigger {
    None,
    Rising,
    Falling,
    Both,
}

impl Default for EdgeTrigger {
    fn default() -> Self {
        EdgeTrigger::None
    }
}

const DIRECTION_TOKENS: [(Direction, &str); 2] =
    [(Direction::Input, "in"), (Direction::Output, "out")];

const LEVEL_TOKENS: [(Level, &str); 2] = [(Level::Low, "0"), (Level::High, "1")];

const EDGE_TOKENS: [(EdgeTrigger, &str); 4] = [
    (EdgeTrigger::None, "none"),
    (EdgeTrigger::Rising, "rising"),
    (EdgeTrigger::Falling, "falling"),
    (EdgeTrigger::Both, "both"),
];

fn token_of<T: PartialEq + Copy>(table: &[(T, &'static str)], value: T) -> &'static str {
    table
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, token)| *token)
        .unwrap_or_default()
}

fn parse_token<T: Copy>(table: &[(T, &'static str)], text: &str, what: &str) -> Result<T, AppError> {
    let text = text.trim();
    table
        .iter()
        .find(|(_, token)| *token == text)
        .map(|(v, _)| *v)
        .ok_or_else(|| AppError::InvalidValue(format!("unknown {what} '{text}'")))
}

impl Direction {
    /// The literal written to `gpio<N>/direction`.
    pub fn as_str(&self) -> &'static str {
        token_of(&DIRECTION_TOKENS, *self)
    }
}

impl Level {
    /// The literal written to and read from `gpio<N>/value`.
    pub fn as_str(&self) -> &'static str {
        token_of(&LEVEL_TOKENS, *self)
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    /// Decodes a raw byte from a value file. Anything but `'0'`/`'1'` is rejected.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(Level::Low),
            b'1' => Some(Level::High),
            _ => None,
        }
    }
}

impl EdgeTrigger {
    /// The literal written to `gpio<N>/edge`.
    pub fn as_str(&self) -> &'static str {
        token_of(&EDGE_TOKENS, *self)
    }
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(&DIRECTION_TOKENS, s, "direction")
    }
}

impl FromStr for Level {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(&LEVEL_TOKENS, s, "level")
    }
}

impl FromStr for EdgeTrigger {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(&EDGE_TOKENS, s, "edge")
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EdgeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
