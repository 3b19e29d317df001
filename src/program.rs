//! # sum the first ten integers
//! LOADI A 10
//! LOADI B 0
//! JZ A 6
//! ADD A B B
//! ADDI A -1
//! JMP 2
//! PRINT B
//! END

use std::convert::TryFrom;
use std::fs;
use std::io;
use std::path::Path;

use crate::errors::MemoryFault;
use crate::memory::Int;

pub mod parse;

pub use parse::ParseError;

/// One instruction line of a program: its whitespace-split tokens plus
/// the line number it came from, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    tokens: Vec<String>,
    line_nr: usize,
}

impl SourceLine {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

/// An ordered sequence of instruction lines, indexed exactly as the
/// program counter addresses it. Loaded once, read-only afterwards.
///
/// Lines are decoded when execution reaches them, so a malformed line
/// only faults a run that actually hits it. [`Program::check`] decodes
/// everything eagerly for tools that want load-time diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    lines: Vec<SourceLine>,
}

impl Program {
    /// Tokenizes `source` into a program, one instruction per line.
    /// Blank lines and `#` comment lines are skipped.
    pub fn parse(source: &str) -> Self {
        Self {
            lines: parse::tokenize(source),
        }
    }

    /// Reads and tokenizes a program from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether `index` addresses an instruction of this program.
    pub fn contains(&self, index: Int) -> bool {
        matches!(usize::try_from(index), Ok(index) if index < self.lines.len())
    }

    /// Fetches the instruction line addressed by `index`.
    ///
    /// An index outside the program is an out-of-bounds fault; a run
    /// must reach `END` to halt normally.
    pub fn fetch(&self, index: Int) -> Result<&SourceLine, MemoryFault> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.lines.get(index))
            .ok_or(MemoryFault::OutOfBounds { address: index })
    }

    /// Decodes every line eagerly.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn check(&self) -> Result<(), Vec<ParseError>> {
        let mut errors = Vec::new();

        for line in &self.lines {
            if let Err(fault) = crate::instruction::Instruction::decode(line.tokens()) {
                let err = ParseError::new(fault, line.line_nr);
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Builds a [`Program`] from instruction lines given as string literals
#[macro_export]
macro_rules! program {
    ( $( $line:literal ),+ $(,)? ) => {
        $crate::program::Program::parse(concat!( $( $line, "\n" ),+ ))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_parse_skips_blanks_and_comments() -> Result<()> {
        let program = Program::parse(
            r#"
            # load and emit
            LOADI A 5

            PRINT A
            END
        "#,
        );

        assert_eq!(program.len(), 3);
        assert_eq!(program.fetch(0)?.tokens(), ["LOADI", "A", "5"]);
        assert_eq!(program.fetch(2)?.tokens(), ["END"]);

        Ok(())
    }

    #[test]
    fn test_line_numbers_survive_skipped_lines() -> Result<()> {
        let program = Program::parse("# intro\n\nLOADI A 1\nEND\n");

        assert_eq!(program.fetch(0)?.line_nr(), 3);
        assert_eq!(program.fetch(1)?.line_nr(), 4);

        Ok(())
    }

    #[test]
    fn test_fetch_out_of_bounds() {
        let program = program!["END"];

        assert_eq!(
            program.fetch(1),
            Err(MemoryFault::OutOfBounds { address: 1 })
        );
        assert_eq!(
            program.fetch(-1),
            Err(MemoryFault::OutOfBounds { address: -1 })
        );
    }

    #[test]
    fn test_contains() {
        let program = program!["LOADI A 1", "END"];

        assert!(program.contains(0));
        assert!(program.contains(1));
        assert!(!program.contains(2));
        assert!(!program.contains(-1));
    }

    #[test]
    fn test_check_accepts_valid_program() {
        let program = program!["LOADI A 5", "LOADI B 0", "ADD A B C", "PRINT C", "END"];

        assert!(program.check().is_ok());
    }

    #[test]
    fn test_check_collects_every_error() {
        let program = Program::parse("LOADI A 5\nFROB A\nMOVE A\nEND\n");

        let errors = program.check().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "error [ln: 2]: no instruction matching `FROB` was found"
        );
        assert_eq!(
            errors[1].to_string(),
            "error [ln: 3]: MOVE expects 2 operand(s), got 1"
        );
    }

    #[test]
    fn test_program_macro_matches_parse() {
        let from_macro = program!["LOADI A 5", "END"];
        let from_str = Program::parse("LOADI A 5\nEND");

        assert_eq!(from_macro, from_str);
    }
}
