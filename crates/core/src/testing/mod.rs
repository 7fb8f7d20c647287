//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use lightseq_core::testing::{MockActuator, MockLineSource};
//!
//! let actuator = Arc::new(MockActuator::new());
//! let mut source = MockLineSource::new(["R,100,G,50", "D,1"]);
//!
//! // Run a controller against them, then inspect what was switched.
//! let kinds = actuator.activation_kinds().await;
//! ```

mod mock_actuator;
mod mock_line_source;

pub use mock_actuator::{MockActuator, RecordedActivation};
pub use mock_line_source::MockLineSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::sequence::{OutputKind, Token};

    /// Build a token from its command letter.
    ///
    /// Panics on an unknown letter.
    pub fn token(letter: char, duration_ms: u64) -> Token {
        let kind = OutputKind::from_letter(letter)
            .unwrap_or_else(|| panic!("unknown output kind letter {letter:?}"));
        Token::new(kind, duration_ms)
    }

    /// Build tokens from `(letter, duration_ms)` pairs.
    pub fn tokens(pairs: &[(char, u64)]) -> Vec<Token> {
        pairs.iter().map(|(letter, ms)| token(*letter, *ms)).collect()
    }

    /// `block` repeated `times` times, as a repeat marker would expand it.
    pub fn repeated(block: &[Token], times: usize) -> Vec<Token> {
        block
            .iter()
            .copied()
            .cycle()
            .take(block.len() * times)
            .collect()
    }
}
