//! Line buffering: turns raw input lines into complete fragments.

use tracing::debug;

use crate::complete::CompletenessRule;

/// Line that terminates the REPL when typed at an empty buffer.
pub const EXIT_SENTINEL: &str = "exit";

/// Prompt shown when no fragment is in progress.
pub const PRIMARY_PROMPT: &str = "go> ";

/// Prompt shown while a fragment spans several lines.
pub const CONTINUATION_PROMPT: &str = "... ";

/// Result of feeding one line to the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// More input is needed before anything can be submitted.
    Pending,
    /// The exit sentinel was entered at an empty buffer.
    Exit,
    /// The buffered lines form a complete fragment.
    Fragment(String),
}

/// Buffers input lines until they form a complete fragment.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    lines: Vec<String>,
    rule: CompletenessRule,
}

impl Accumulator {
    pub fn new(rule: CompletenessRule) -> Self {
        Self {
            lines: Vec::new(),
            rule,
        }
    }

    pub fn rule(&self) -> CompletenessRule {
        self.rule
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn prompt(&self) -> &'static str {
        if self.lines.is_empty() {
            PRIMARY_PROMPT
        } else {
            CONTINUATION_PROMPT
        }
    }

    /// Drop any partially entered fragment.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Feed one raw line (without its trailing newline).
    ///
    /// A literally empty line submits whatever is buffered, even when the
    /// delimiter heuristics would keep waiting.
    pub fn accept_line(&mut self, line: &str) -> LineOutcome {
        if self.lines.is_empty() && line == EXIT_SENTINEL {
            return LineOutcome::Exit;
        }

        self.lines.push(line.to_string());
        let joined = self.lines.join("\n");

        if joined.trim().is_empty() {
            if line.is_empty() {
                self.lines.clear();
            }
            return LineOutcome::Pending;
        }

        let forced = line.is_empty();
        if forced || self.rule.is_complete(&joined) {
            debug!(lines = self.lines.len(), forced, "fragment complete");
            self.lines.clear();
            return LineOutcome::Fragment(joined.trim().to_string());
        }

        LineOutcome::Pending
    }
}
