use std::io;
use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The source text is empty.
    #[error("Invalid source: the program is empty")]
    InvalidSource,

    /// A `]` was found with no open `[` to close.
    /// The position is 1-based and counts characters.
    #[error("Position {position}: Unexpected ']'")]
    UnexpectedClosingBracket { position: usize },

    /// One or more `[` were never closed. Positions are 1-based, in ascending order.
    #[error("Unmatched '[': {} are unclosed", .positions.iter().join(", "))]
    UnclosedOpeningBrackets { positions: Vec<usize> },

    /// The code generator saw an unbalanced loop stack.
    /// Validated programs never get here.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(&'static str),

    /// The tape must contain at least one cell.
    #[error("Invalid tape length: {0}")]
    InvalidTapeLength(usize),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The external compiler driver failed to produce an executable.
    #[error("Cannot link using {driver}: {message}")]
    Toolchain { driver: String, message: String },

    /// The interpreter moved the head before the first cell.
    #[error("Tape underflow")]
    TapeUnderflow,

    /// The interpreter moved the head past the last cell.
    #[error("Tape overflow")]
    TapeOverflow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_messages() {
        let e = CompileError::UnexpectedClosingBracket { position: 6 };
        assert_eq!(e.to_string(), "Position 6: Unexpected ']'");

        let e = CompileError::UnclosedOpeningBrackets { positions: vec![1, 3] };
        assert_eq!(e.to_string(), "Unmatched '[': 1, 3 are unclosed");

        let e = CompileError::UnclosedOpeningBrackets { positions: vec![1] };
        assert_eq!(e.to_string(), "Unmatched '[': 1 are unclosed");
    }

    #[test]
    fn test_io_conversion() {
        let e: CompileError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(e.to_string().starts_with("I/O error: "));
    }
}
