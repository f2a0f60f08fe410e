//! Structured compiler errors shared by the lexer and the parser.
//!
//! These are fatal for a single compile call and always carry the
//! position of the offending character or token when one exists.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A source position. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: Option<usize>,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column: Some(column) }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sa linya {}", self.line)?;
        if let Some(column) = self.column {
            write!(f, ", hanay {}", column)?;
        }
        Ok(())
    }
}

/// Render `"<category> sa linya L[, hanay C]: <message>"`, or
/// `"<category>: <message>"` when no position is known.
pub fn format_diagnostic(
    category: &str,
    location: Option<Location>,
    message: impl fmt::Display,
) -> String {
    match location {
        Some(location) => format!("{} {}: {}", category, location, message),
        None => format!("{}: {}", category, message),
    }
}

/// What went wrong, without position information.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ErrorKind {
    #[error("Hindi wastong karakter: \"{0}\"")]
    InvalidCharacter(char),
    #[error("Hindi wastong numero: \"{0}\"")]
    InvalidNumber(String),
    #[error("Hindi wastong escape sequence: \"\\{0}\"")]
    InvalidEscape(char),
    #[error("Hindi nakumpleto ang string")]
    UnterminatedString,
    #[error("Hindi nakumpleto ang komento")]
    UnterminatedComment,
    #[error("Inaasahan ang {expected} ngunit nakakuha ng {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("Hindi inaasahang pagtatapos ng input")]
    UnexpectedEndOfInput,
    #[error("Masyadong malalim ang pagkakapaloob (higit sa {0} antas)")]
    NestingTooDeep(usize),
}

/// A fatal lexical or parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerError {
    pub kind: ErrorKind,
    pub location: Option<Location>,
}

impl CompilerError {
    pub fn at(kind: ErrorKind, line: usize, column: usize) -> Self {
        Self { kind, location: Some(Location::new(line, column)) }
    }

    pub fn unpositioned(kind: ErrorKind) -> Self {
        Self { kind, location: None }
    }

    pub fn line(&self) -> Option<usize> {
        self.location.map(|l| l.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.location.and_then(|l| l.column)
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_diagnostic("Mali", self.location, &self.kind))
    }
}

impl std::error::Error for CompilerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

pub type CompileResult<T> = Result<T, CompilerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_position() {
        let err = CompilerError::at(ErrorKind::InvalidCharacter('@'), 3, 7);
        assert_eq!(err.to_string(), "Mali sa linya 3, hanay 7: Hindi wastong karakter: \"@\"");
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.column(), Some(7));
    }

    #[test]
    fn test_line_only_and_no_position() {
        assert_eq!(
            format_diagnostic("Babala", Some(Location { line: 2, column: None }), "x"),
            "Babala sa linya 2: x"
        );
        let err = CompilerError::unpositioned(ErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.to_string(), "Mali: Hindi inaasahang pagtatapos ng input");
        assert_eq!(err.line(), None);
    }
}
