//! Error types for XML normalization
//!
//! All fallible operations return `Result<T, Error>`.
//! Every failure is classified into one of three kinds so that callers can
//! tell the user whether to supply different input, fix their XML, or
//! reduce the document size.

use std::fmt;

use serde::Serialize;

/// Position in source text for error reporting (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Compute line and column of a byte offset into `text`.
    ///
    /// Offsets past the end clamp to the end of the text; offsets inside a
    /// multi-byte character count that character as its own column.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let mut line = 1;
        let mut column = 1;
        for (i, ch) in text.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Normalization error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Input absent, not text, or empty after trimming
    #[error("Invalid XML input: {0}")]
    InvalidInput(String),

    /// Structurally invalid XML
    #[error("Malformed XML: {message}{}", at(.location))]
    MalformedXml {
        message: String,
        location: Option<Location>,
    },

    /// Document too large or too deeply nested to process
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),
}

fn at(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" ({})", loc),
        None => String::new(),
    }
}

impl Error {
    /// Malformed XML without a known position
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedXml {
            message: message.into(),
            location: None,
        }
    }

    /// Malformed XML at a byte offset of `source`
    pub fn malformed_at(message: impl Into<String>, source: &str, offset: usize) -> Self {
        Error::MalformedXml {
            message: message.into(),
            location: Some(Location::from_offset(source, offset)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::MalformedXml { .. } => ErrorKind::MalformedXml,
            Error::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
        }
    }
}

/// Classification of an [`Error`], stable for display and JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    MalformedXml,
    ResourceExhausted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::MalformedXml => "malformed_xml",
            ErrorKind::ResourceExhausted => "resource_exhausted",
        };
        f.write_str(name)
    }
}

/// An [`Error`] tagged with the label of the input it came from,
/// e.g. `selection` or `clipboard`, so the user knows which side to fix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{label}: {error}")]
pub struct LabeledError {
    pub label: String,
    pub error: Error,
}

impl LabeledError {
    pub fn new(label: impl Into<String>, error: Error) -> Self {
        LabeledError {
            label: label.into(),
            error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Result type alias for normalization operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let text = "<a>\n  <b>\n</a>";
        assert_eq!(Location::from_offset(text, 0), Location { line: 1, column: 1 });
        assert_eq!(Location::from_offset(text, 6), Location { line: 2, column: 3 });
        assert_eq!(Location::from_offset(text, 999), Location { line: 3, column: 5 });
    }

    #[test]
    fn test_display_includes_location() {
        let err = Error::malformed_at("mismatched end tag", "<a>\n</b>", 4);
        assert_eq!(
            err.to_string(),
            "Malformed XML: mismatched end tag (line 2, column 1)"
        );
        assert_eq!(Error::malformed("oops").to_string(), "Malformed XML: oops");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            Error::InvalidInput("empty".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(Error::malformed("x").kind(), ErrorKind::MalformedXml);
        assert_eq!(
            Error::ResourceExhausted("deep".into()).kind().to_string(),
            "resource_exhausted"
        );
    }

    #[test]
    fn test_labeled_error_display() {
        let err = LabeledError::new("clipboard", Error::malformed("unclosed tag <root>"));
        assert_eq!(err.to_string(), "clipboard: Malformed XML: unclosed tag <root>");
        assert_eq!(err.kind(), ErrorKind::MalformedXml);
    }
}
