//! Error types for label parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing a label key or value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// The input is empty.
    #[error("{what} cannot be empty")]
    Empty { what: &'static str },

    /// The input exceeds the maximum length.
    #[error("{what} is {len} characters long, maximum is {max}")]
    TooLong {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// The input contains a character outside the allowed set.
    #[error("{what} '{value}' contains invalid character {ch:?}")]
    InvalidCharacter {
        what: &'static str,
        value: String,
        ch: char,
    },

    /// The input does not begin and end with an alphanumeric character.
    #[error("{what} '{value}' must start and end with an alphanumeric character")]
    InvalidBoundary { what: &'static str, value: String },

    /// The prefix of a label key is not a valid DNS subdomain.
    #[error("invalid label key prefix '{prefix}'")]
    InvalidPrefix { prefix: String },
}

impl LabelError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, LabelError::Empty { .. })
    }

    /// Returns true if this error indicates a malformed character or boundary.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            LabelError::InvalidCharacter { .. } | LabelError::InvalidBoundary { .. }
        )
    }
}
