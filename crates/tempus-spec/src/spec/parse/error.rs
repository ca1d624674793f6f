//! Specification parse error types.

use std::fmt;

/// Result type for specification parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred while tokenizing a specification.
///
/// No partial token tree accompanies an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Human-readable, capitalized description naming the remainder.
    pub message: String,
    /// The unparsed input at the point of failure, verbatim.
    pub remainder: String,
}

impl ParseError {
    /// Creates a new parse error. The message is `"<kind>: '<remainder>'"`.
    #[must_use]
    pub fn new(kind: ParseErrorKind, remainder: impl Into<String>) -> Self {
        let remainder = remainder.into();
        Self {
            message: format!("{kind}: '{remainder}'"),
            kind,
            remainder,
        }
    }

    /// Creates an error for input left over after the best match.
    #[must_use]
    pub fn unexpected(remainder: &str) -> Self {
        Self::new(ParseErrorKind::UnexpectedInput, remainder)
    }

    /// Creates an error for empty input.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kind: ParseErrorKind::Empty,
            message: ParseErrorKind::Empty.to_string(),
            remainder: String::new(),
        }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Nothing to parse.
    Empty,
    /// Input remained after the longest successful match.
    UnexpectedInput,
    /// An interval joins two durations.
    DurationInterval,
    /// An interval separator or recurrence is not followed by an endpoint.
    MissingEndpoint,
    /// A BC marker follows a masked year.
    MaskedBcYear,
    /// A number does not fit the value range.
    NumberOutOfRange,
    /// A range stride of zero.
    ZeroStep,
    /// Selections or token sets nest deeper than configured.
    TooDeep { max_depth: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty specification"),
            Self::UnexpectedInput => write!(f, "Unexpected input"),
            Self::DurationInterval => write!(f, "Interval cannot join two durations"),
            Self::MissingEndpoint => write!(f, "Expected an interval endpoint"),
            Self::MaskedBcYear => write!(f, "BC marker requires a decimal year"),
            Self::NumberOutOfRange => write!(f, "Number out of range"),
            Self::ZeroStep => write!(f, "Range step cannot be zero"),
            Self::TooDeep { max_depth } => {
                write!(f, "Nesting exceeds the maximum depth of {max_depth}")
            }
        }
    }
}
