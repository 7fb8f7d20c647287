//! Types shared by the parser and the dispatch engine.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::parser::ParseDiagnostic;

/// One of the mutually exclusive outputs a sequence can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Red,
    Green,
    Yellow,
}

impl OutputKind {
    /// Number of output kinds.
    pub const COUNT: usize = 3;

    /// Every kind, in table order (`ALL[k.index()] == k`).
    pub const ALL: [OutputKind; Self::COUNT] =
        [OutputKind::Red, OutputKind::Green, OutputKind::Yellow];

    /// Look up a kind by its command letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.letter() == letter)
    }

    /// The letter used for this kind in command lines.
    pub fn letter(self) -> char {
        match self {
            OutputKind::Red => 'R',
            OutputKind::Green => 'G',
            OutputKind::Yellow => 'Y',
        }
    }

    /// Slot of this kind in a [`PerKind`] table.
    pub fn index(self) -> usize {
        match self {
            OutputKind::Red => 0,
            OutputKind::Green => 1,
            OutputKind::Yellow => 2,
        }
    }

    /// Lowercase name, used in logs and status output.
    pub fn name(self) -> &'static str {
        match self {
            OutputKind::Red => "red",
            OutputKind::Green => "green",
            OutputKind::Yellow => "yellow",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed table holding one value per [`OutputKind`].
///
/// Queues, wake conditions and lamp patterns are all stored this way, so a
/// new kind only needs a new enum variant and table entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerKind<T>([T; OutputKind::COUNT]);

impl<T> PerKind<T> {
    /// Build a table by calling `f` once per kind.
    pub fn from_fn(mut f: impl FnMut(OutputKind) -> T) -> Self {
        Self(std::array::from_fn(|i| f(OutputKind::ALL[i])))
    }

    /// Iterate over `(kind, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputKind, &T)> {
        OutputKind::ALL.into_iter().zip(self.0.iter())
    }

    /// Map every entry into a new table.
    pub fn map<U>(&self, mut f: impl FnMut(OutputKind, &T) -> U) -> PerKind<U> {
        PerKind::from_fn(|kind| f(kind, &self[kind]))
    }
}

impl<T> Index<OutputKind> for PerKind<T> {
    type Output = T;

    fn index(&self, kind: OutputKind) -> &T {
        &self.0[kind.index()]
    }
}

impl<T> IndexMut<OutputKind> for PerKind<T> {
    fn index_mut(&mut self, kind: OutputKind) -> &mut T {
        &mut self.0[kind.index()]
    }
}

/// One parsed unit of work: hold `kind` active for `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: OutputKind,
    pub duration_ms: u64,
}

impl Token {
    pub fn new(kind: OutputKind, duration_ms: u64) -> Self {
        Self { kind, duration_ms }
    }

    /// Hold duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.letter(), self.duration_ms)
    }
}

/// The fully expanded result of parsing one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Tokens in activation order, repeat marker already expanded.
    pub tokens: Vec<Token>,
    /// How many times the tuple block was repeated.
    pub repeat_count: u32,
    /// Recoverable problems found while parsing.
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl Sequence {
    /// Number of activations this sequence will produce.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
