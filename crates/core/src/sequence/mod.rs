//! Command-line parsing for light sequences.
//!
//! A sequence line lists `<kind>,<duration_ms>` tuples, optionally followed by
//! a `T,<count>` repeat marker:
//!
//! ```text
//! R,1000,G,500,Y,1000,T,2
//! ```
//!
//! Parsing expands the repeat marker, so the resulting [`Sequence`] holds
//! tokens in exactly the order they must be activated.

mod parser;
mod types;

pub use parser::{parse_line, ParseDiagnostic, SequenceError, MAX_REPEAT, MIN_REPEAT};
pub use types::{OutputKind, PerKind, Sequence, Token};
