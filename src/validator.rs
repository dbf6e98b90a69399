use crate::CompileError;

/// Source text whose brackets are known to be balanced.
///
/// The only way to obtain one is through [`validate`](crate::validator::validate),
/// so the parser never needs to check nesting again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedSource<'a> {
    source: &'a str
}

impl<'a> ValidatedSource<'a> {

    /// Returns the underlying source text.
    pub fn as_str(&self) -> &'a str {
        self.source
    }

}

/// Checks that every `[` in `source` is matched by a `]` and vice versa.
///
/// Positions reported in errors are 1-based character positions.
/// An unexpected `]` stops the scan immediately, while unclosed `[` are
/// only reported once the whole source has been scanned.
pub fn validate(source: &str) -> Result<ValidatedSource<'_>, CompileError> {
    if source.is_empty() {
        return Err(CompileError::InvalidSource);
    }

    let mut open: Vec<usize> = Vec::new();
    for (index, c) in source.chars().enumerate() {
        match c {
            '[' => open.push(index + 1),
            ']' => {
                if open.pop().is_none() {
                    debug!("Unexpected ']' at position {}.", index + 1);
                    return Err(CompileError::UnexpectedClosingBracket { position: index + 1 });
                }
            },
            _ => {}
        }
    }

    if !open.is_empty() {
        debug!("{} unclosed '[' found.", open.len());

        // The stack is already in source order, innermost last
        return Err(CompileError::UnclosedOpeningBrackets { positions: open });
    }

    trace!("Source validated.");
    Ok(ValidatedSource { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unexpected(source: &str, expected: usize) {
        match validate(source) {
            Err(CompileError::UnexpectedClosingBracket { position }) => assert_eq!(position, expected),
            r => panic!("Expected unexpected closing bracket error. Got: {:?}", r)
        }
    }

    fn assert_unclosed(source: &str, expected: &[usize]) {
        match validate(source) {
            Err(CompileError::UnclosedOpeningBrackets { positions }) => assert_eq!(positions, expected),
            r => panic!("Expected unclosed opening brackets error. Got: {:?}", r)
        }
    }

    #[test]
    fn test_empty_source() {
        match validate("") {
            Err(CompileError::InvalidSource) => {},
            r => panic!("Expected invalid source error. Got: {:?}", r)
        }
    }

    #[test]
    fn test_balanced() {
        assert!(validate("+++").is_ok());
        assert!(validate("[+++]").is_ok());
        assert!(validate("[+[,][+[.]-]-]").is_ok());
        assert!(validate("no brackets, only comments").is_ok());
        assert_eq!(validate("[-]").unwrap().as_str(), "[-]");
    }

    #[test]
    fn test_unexpected_closing_bracket() {
        assert_unexpected("]", 1);
        assert_unexpected("[+++]]", 6);
        assert_unexpected("[]]", 3);

        // The scan stops at the first offending bracket, even with unclosed ones after it
        assert_unexpected("+]]", 2);
        assert_unexpected("]][[", 1);
    }

    #[test]
    fn test_unclosed_opening_brackets() {
        assert_unclosed("[", &[1]);
        assert_unclosed("[[+++]", &[1]);
        assert_unclosed("[+[+[+]", &[1, 3]);
        assert_unclosed("[][", &[3]);
        assert_unclosed("[[", &[1, 2]);
    }

    #[test]
    fn test_positions_count_characters() {
        // 'é' takes two bytes but is a single character
        assert_unexpected("é]", 2);
        assert_unclosed("éé[", &[3]);
    }

    #[test]
    fn test_diagnostic_text() {
        let e = validate("[+++]]").unwrap_err();
        assert!(e.to_string().contains("Position 6: Unexpected ']'"));

        let e = validate("[+[+[+]").unwrap_err();
        assert!(e.to_string().contains("1, 3 are unclosed"));
    }
}
