//! Sequence line parser.

use thiserror::Error;

use super::types::{OutputKind, Sequence, Token};

/// Smallest accepted repeat count.
pub const MIN_REPEAT: u32 = 1;

/// Largest accepted repeat count.
pub const MAX_REPEAT: u32 = 100;

/// Marker that separates the tuple block from the repeat count.
const REPEAT_MARKER: char = 'T';

/// A recoverable problem found while parsing a line.
///
/// Diagnostics never stop the line from being dispatched; they only explain
/// why some tuples did not become tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDiagnostic {
    /// A tuple could not be read; the rest of the block was skipped.
    #[error("malformed tuple at offset {position}: {fragment:?}")]
    MalformedTuple { position: usize, fragment: String },

    /// A well-formed tuple named a kind that does not exist; it was dropped.
    #[error("unknown output kind {letter:?} at offset {position}")]
    UnknownKind { letter: char, position: usize },

    /// The repeat count could not be read; one repetition is used.
    #[error("invalid repeat marker {fragment:?}, repeating once")]
    InvalidRepeat { fragment: String },
}

/// An unrecoverable parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The repeat count is outside `MIN_REPEAT..=MAX_REPEAT`.
    #[error("repeat count {count} outside allowed range {}..={}", MIN_REPEAT, MAX_REPEAT)]
    RepeatOutOfRange { count: i64 },
}

/// Parse one command line into its expanded token sequence.
///
/// The tuple block is scanned once and then repeated; scanning is
/// deterministic, so every repetition yields the same tokens. Diagnostics
/// are therefore reported once per line, not once per repetition.
pub fn parse_line(line: &str) -> Result<Sequence, SequenceError> {
    let line = line.trim();
    let mut diagnostics = Vec::new();

    let (block, repeat_count) = match line.find(REPEAT_MARKER) {
        Some(at) => {
            let marker = &line[at..];
            let count = parse_repeat(marker).unwrap_or_else(|| {
                diagnostics.push(ParseDiagnostic::InvalidRepeat {
                    fragment: marker.to_string(),
                });
                1
            });
            (&line[..at], count)
        }
        None => (line, 1),
    };

    if !(i64::from(MIN_REPEAT)..=i64::from(MAX_REPEAT)).contains(&repeat_count) {
        return Err(SequenceError::RepeatOutOfRange {
            count: repeat_count,
        });
    }
    // Range-checked above.
    let repeat_count = repeat_count as u32;

    let block_tokens = scan_block(block, &mut diagnostics);

    let mut tokens = Vec::with_capacity(block_tokens.len() * repeat_count as usize);
    for _ in 0..repeat_count {
        tokens.extend_from_slice(&block_tokens);
    }

    Ok(Sequence {
        tokens,
        repeat_count,
        diagnostics,
    })
}

/// Read `T,<int>`.
fn parse_repeat(marker: &str) -> Option<i64> {
    let rest = marker.strip_prefix(REPEAT_MARKER)?.strip_prefix(',')?;
    scan_int(rest).map(|(value, _)| value)
}

/// Scan tuples left to right until the block ends or a tuple is malformed.
fn scan_block(block: &str, diagnostics: &mut Vec<ParseDiagnostic>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < block.len() {
        let rest = &block[pos..];

        let tuple = match scan_tuple(rest) {
            Some(tuple) if tuple.duration >= 0 => tuple,
            _ => {
                diagnostics.push(ParseDiagnostic::MalformedTuple {
                    position: pos,
                    fragment: rest.to_string(),
                });
                break;
            }
        };

        match OutputKind::from_letter(tuple.letter) {
            // Non-negative, checked in the match above.
            Some(kind) => tokens.push(Token::new(kind, tuple.duration as u64)),
            None => diagnostics.push(ParseDiagnostic::UnknownKind {
                letter: tuple.letter,
                position: pos,
            }),
        }

        pos += tuple.consumed;
        let tail = &block[pos..];
        pos += tail.len() - tail.trim_start_matches([',', ' ']).len();
    }

    tokens
}

struct ScannedTuple {
    letter: char,
    duration: i64,
    /// Bytes consumed from the input.
    consumed: usize,
}

/// Read `<char>,<int>` from the front of `input`.
fn scan_tuple(input: &str) -> Option<ScannedTuple> {
    let mut chars = input.char_indices();
    let (_, letter) = chars.next()?;
    let (comma_at, comma) = chars.next()?;
    if comma != ',' {
        return None;
    }

    let value_start = comma_at + comma.len_utf8();
    let (duration, used) = scan_int(&input[value_start..])?;

    Some(ScannedTuple {
        letter,
        duration,
        consumed: value_start + used,
    })
}

/// Read a signed decimal integer, skipping leading whitespace.
///
/// Values beyond the `i64` range saturate, so an oversized repeat count is
/// still rejected as out of range rather than read as unparsable.
///
/// Returns the value and the number of bytes consumed.
fn scan_int(input: &str) -> Option<(i64, usize)> {
    let trimmed = input.trim_start();
    let skipped = input.len() - trimmed.len();
    let bytes = trimmed.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    let value = trimmed[..end].parse::<i64>().unwrap_or(if bytes[0] == b'-' {
        i64::MIN
    } else {
        i64::MAX
    });
    Some((value, skipped + end))
}
