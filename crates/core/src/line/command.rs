//! Classification of incoming lines.

/// What a single input line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `D,1` or `D,0`: switch diagnostic verbosity on or off.
    Diagnostics(bool),
    /// Nothing but whitespace.
    Empty,
    /// Anything else is handed to the sequence parser.
    Sequence(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => Command::Empty,
            "D,1" => Command::Diagnostics(true),
            "D,0" => Command::Diagnostics(false),
            text => Command::Sequence(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_lines() {
        assert_eq!(Command::parse("D,1"), Command::Diagnostics(true));
        assert_eq!(Command::parse(" D,0 \r"), Command::Diagnostics(false));
    }

    #[test]
    fn test_sequence_and_empty() {
        assert_eq!(Command::parse("R,10,T,2"), Command::Sequence("R,10,T,2"));
        assert_eq!(Command::parse("  "), Command::Empty);
        // Only the exact toggles are control lines.
        assert_eq!(Command::parse("D,2"), Command::Sequence("D,2"));
    }
}
