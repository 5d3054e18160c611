//! Recurrence text parsing error types.

use std::fmt;

/// Result type for recurrence text parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Error type for recurrence text parsing.
///
/// Every error names the offending attribute key (`FREQ`, `BYDAY`, `EXDATE`,
/// ...) so an importer can report exactly which token it could not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Kind of error.
    pub kind: ParseErrorKind,
    /// Attribute key or line name the error was raised for.
    pub token: String,
    /// Additional context about the error, usually the rejected value.
    pub context: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            token: token.into(),
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in `{}`", self.kind, self.token)?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {ctx}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Rule part without a `=` separator.
    InvalidRulePart,
    /// Rule part name not defined by RFC 5545.
    UnknownRulePart,
    /// Same rule part given twice.
    DuplicateRulePart,
    /// Content line other than DTSTART, RRULE or EXDATE.
    UnknownProperty,
    /// Content line without a `:` separator.
    MissingColon,
    /// Invalid date format.
    InvalidDate,
    /// Invalid date-time format.
    InvalidDateTime,
    /// Invalid integer or integer list.
    InvalidInteger,
    /// Invalid frequency.
    InvalidFrequency,
    /// Invalid weekday.
    InvalidWeekday,
    /// UNTIL and COUNT are mutually exclusive.
    UntilCountConflict,
    /// No FREQ part.
    MissingFrequency,
    /// More than one RRULE line.
    MultipleRules,
    /// Empty value.
    EmptyValue,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRulePart => write!(f, "invalid rule part"),
            Self::UnknownRulePart => write!(f, "unknown rule part"),
            Self::DuplicateRulePart => write!(f, "duplicate rule part"),
            Self::UnknownProperty => write!(f, "unknown property"),
            Self::MissingColon => write!(f, "missing colon separator"),
            Self::InvalidDate => write!(f, "invalid date format"),
            Self::InvalidDateTime => write!(f, "invalid date-time format"),
            Self::InvalidInteger => write!(f, "invalid integer value"),
            Self::InvalidFrequency => write!(f, "invalid frequency"),
            Self::InvalidWeekday => write!(f, "invalid weekday"),
            Self::UntilCountConflict => write!(f, "UNTIL and COUNT are mutually exclusive"),
            Self::MissingFrequency => write!(f, "missing FREQ"),
            Self::MultipleRules => write!(f, "more than one RRULE"),
            Self::EmptyValue => write!(f, "empty value"),
        }
    }
}
