//! Structural completeness heuristics.
//!
//! These decide whether buffered input lines form a submittable fragment.
//! They count delimiters and look at a few prefixes; they are not a grammar,
//! and their false positives/negatives are part of the observable behavior.

use serde::{Deserialize, Serialize};

/// Which completeness heuristic the accumulator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletenessRule {
    /// Keyword, struct-literal and slice-literal aware rule set.
    #[default]
    Structural,
    /// Brace balance only, with a shortcut for brace-free input.
    Simple,
}

impl CompletenessRule {
    pub fn is_complete(self, input: &str) -> bool {
        match self {
            CompletenessRule::Structural => is_complete(input),
            CompletenessRule::Simple => is_complete_simple(input),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DelimiterCounts {
    open_braces: usize,
    close_braces: usize,
    open_parens: usize,
    close_parens: usize,
}

impl DelimiterCounts {
    fn of(input: &str) -> Self {
        let mut counts = Self::default();
        for ch in input.chars() {
            match ch {
                '{' => counts.open_braces += 1,
                '}' => counts.close_braces += 1,
                '(' => counts.open_parens += 1,
                ')' => counts.close_parens += 1,
                _ => {}
            }
        }
        counts
    }

    fn braces_balanced(&self) -> bool {
        self.open_braces == self.close_braces
    }

    fn parens_balanced(&self) -> bool {
        self.open_parens == self.close_parens
    }
}

/// Control-flow prefixes whose conditions may contain unbalanced-looking text;
/// only braces are checked for these.
const CONTROL_PREFIXES: &[&str] = &["if ", "for "];

/// Markers for composite struct types/literals.
const STRUCT_MARKERS: &[&str] = &["struct{", "struct {"];

/// Determine whether `input` is a complete fragment.
pub fn is_complete(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }

    let counts = DelimiterCounts::of(input);

    if CONTROL_PREFIXES.iter().any(|prefix| input.starts_with(prefix)) {
        return counts.braces_balanced();
    }

    if STRUCT_MARKERS.iter().any(|marker| input.contains(marker)) {
        return counts.braces_balanced();
    }

    // A slice/array literal split across lines must end on an element
    // separator or the closing bracket.
    if input.contains('[') {
        let last_line = input.lines().last().unwrap_or("").trim();
        if !last_line.ends_with(',') && !last_line.ends_with(']') {
            return false;
        }
    }

    if counts.open_braces == 0
        && counts.parens_balanced()
        && !input.ends_with('{')
        && !input.ends_with(',')
    {
        return true;
    }

    counts.braces_balanced() && counts.parens_balanced()
}

/// The reduced variant: brace-free input without a trailing `{`/`,` is
/// complete, anything else needs balanced braces.
pub fn is_complete_simple(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }

    let counts = DelimiterCounts::of(input);
    if counts.open_braces == 0 && !input.ends_with('{') && !input.ends_with(',') {
        return true;
    }
    counts.braces_balanced()
}
