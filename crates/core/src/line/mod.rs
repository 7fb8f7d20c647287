//! Line input: byte framing and command classification.

mod command;
mod framer;
mod source;

pub use command::Command;
pub use framer::{LineFramer, DEFAULT_MAX_LINE_LEN};
pub use source::{LineSource, LineSourceError, ReaderLineSource};
