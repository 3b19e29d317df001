use std::error;
use std::fmt;

use crate::errors::DecodeFault;

use super::SourceLine;

/// A decode fault tied to the source line it came from. Produced by
/// [`Program::check`](super::Program::check).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    fault: DecodeFault,
    line_nr: usize,
}

impl ParseError {
    pub(crate) fn new(fault: DecodeFault, line_nr: usize) -> Self {
        Self { fault, line_nr }
    }

    pub fn fault(&self) -> &DecodeFault {
        &self.fault
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error [ln: {}]: {}", self.line_nr, self.fault)
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.fault)
    }
}

/// Splits `source` into instruction lines. Each instruction should be
/// located on its own line; blank lines and lines starting with `#`
/// are skipped. Line numbers are 1-based.
pub(crate) fn tokenize(source: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();

    for (nr, line) in source.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            // Comment or empty line; skip
            continue;
        }

        lines.push(SourceLine {
            tokens: line.split_whitespace().map(str::to_owned).collect(),
            line_nr: nr + 1,
        });
    }

    lines
}
