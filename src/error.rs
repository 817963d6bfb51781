//! Error handling for blood pressure parsing and reporting.
//!
//! Parsing failures are classified by what went wrong with the input
//! (a value that is not an integer, a token with the wrong shape, a missing
//! slot, a line the pattern does not match, a malformed JSON document).
//! The remaining variants cover the environment around the parsers.

use crate::constants::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("can't convert {field} to INT: '{value}'")]
    ValueConversion { field: String, value: String },

    #[error("wrong number of values in token, needed {expected} got {found} from '{token}'")]
    TokenShape {
        token: String,
        expected: usize,
        found: usize,
    },

    #[error("not enough measurements on line, needed {expected} got {found} from '{line}'")]
    MissingSlot {
        line: String,
        expected: usize,
        found: usize,
    },

    #[error("pattern does not match line '{line}'")]
    NoMatch { line: String },

    #[error("malformed JSON document: {reason}")]
    MalformedDocument { reason: String },

    #[error("{library} is not available: {message}")]
    Environment { library: String, message: String },

    #[error("no data found in {sources} source(s)")]
    NoData { sources: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a value conversion error for a core field
    pub fn value_conversion(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ValueConversion {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a token shape error
    pub fn token_shape(token: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::TokenShape {
            token: token.into(),
            expected,
            found,
        }
    }

    /// Create a missing slot error
    pub fn missing_slot(line: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::MissingSlot {
            line: line.into(),
            expected,
            found,
        }
    }

    pub fn no_match(line: impl Into<String>) -> Self {
        Self::NoMatch { line: line.into() }
    }

    pub fn malformed_document(reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            reason: reason.into(),
        }
    }

    /// Create an error for a missing rendering backend or library
    pub fn environment(library: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Environment {
            library: library.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error bound to the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the failures a parser raises while reading measurements
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::ValueConversion { .. }
                | Self::TokenShape { .. }
                | Self::MissingSlot { .. }
                | Self::NoMatch { .. }
                | Self::MalformedDocument { .. }
        )
    }

    /// Process exit status for this error category
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Environment { .. } => exit_codes::ENVIRONMENT,
            Self::NoData { .. } => exit_codes::NO_DATA,
            Self::Configuration { .. } | Self::Io { .. } | Self::Json(_) => {
                exit_codes::CONFIGURATION
            }
            _ => exit_codes::PARSING,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
