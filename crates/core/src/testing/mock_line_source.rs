//! Mock line source for testing.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::line::{LineSource, LineSourceError};

/// Serves a fixed script of lines, then reports end of input.
#[derive(Debug, Clone, Default)]
pub struct MockLineSource {
    lines: VecDeque<String>,
}

impl MockLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a line to the script.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    /// Lines not yet served.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl LineSource for MockLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
        Ok(self.lines.pop_front())
    }
}
