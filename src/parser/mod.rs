//! Parsers that turn text lines into measurement datasets
//!
//! Every input format is a variant of [`ParserKind`]. A kind declares the
//! [`ParseOption`]s it reads and builds a boxed [`DatasetParser`] from a
//! [`ParseOptions`] value.
//!
//! ## Formats
//!
//! - [`plain`] - `sys/dia/pulse` tokens, several per line
//! - [`json`] - one JSON array of `[sys, dia, pulse]` arrays or objects
//! - [`pattern`] - a regular expression with named groups per line
//! - [`delimited`] - CSV-like records mapped onto field names
//!
//! ## Usage
//!
//! ```rust
//! use bpdiag::config::ParseOptions;
//! use bpdiag::parser::ParserKind;
//!
//! # fn example() -> bpdiag::Result<()> {
//! let parser = ParserKind::Plain.build(&ParseOptions::default())?;
//! let mut lines = vec!["136/83/65, 132/82/70".to_string()].into_iter();
//! let dataset = parser.parse(&mut lines)?;
//! assert_eq!(dataset.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod delimited;
pub mod json;
pub mod pattern;
pub mod plain;

#[cfg(test)]
pub mod tests;

use crate::config::{ErrorMode, ParseOption, ParseOptions};
use crate::error::{Error, Result};
use crate::models::Dataset;
use std::fmt;
use std::str::FromStr;

pub use delimited::DelimitedParser;
pub use json::JsonParser;
pub use pattern::PatternParser;
pub use plain::PlainParser;

/// Parses a sequence of text lines into a [`Dataset`]
pub trait DatasetParser {
    /// Consume `lines` and return the parsed dataset
    ///
    /// Under [`ErrorMode::Strict`] and [`ErrorMode::Lenient`] the first
    /// non-tolerated problem aborts parsing and no partial result is returned.
    fn parse(&self, lines: &mut dyn Iterator<Item = String>) -> Result<Dataset>;

    fn kind(&self) -> ParserKind;
}

/// The available input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParserKind {
    /// SYS/DIA/PULSE tokens, one or more per line
    #[default]
    Plain,
    /// A JSON array of measurements
    Json,
    /// Named groups of a regular expression, one match per line
    Regex,
    /// Delimited records mapped onto field names
    Csv,
}

impl ParserKind {
    pub const ALL: [ParserKind; 4] = [
        ParserKind::Plain,
        ParserKind::Json,
        ParserKind::Regex,
        ParserKind::Csv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParserKind::Plain => "plain",
            ParserKind::Json => "json",
            ParserKind::Regex => "regex",
            ParserKind::Csv => "csv",
        }
    }

    /// Whether the parser buffers all lines before parsing any of them
    pub fn reads_whole_document(self) -> bool {
        matches!(self, ParserKind::Json)
    }

    /// Options this parser reads; everything else is ignored
    pub fn accepted_options(self) -> &'static [ParseOption] {
        match self {
            ParserKind::Plain => &[
                ParseOption::ErrorMode,
                ParseOption::MaxEntries,
                ParseOption::SkipMarker,
                ParseOption::Separator,
                ParseOption::Delimiter,
                ParseOption::AlignByLine,
                ParseOption::KeepEmptyLines,
            ],
            ParserKind::Json => &[ParseOption::ErrorMode, ParseOption::AsObject],
            ParserKind::Regex => &[ParseOption::ErrorMode, ParseOption::Pattern],
            ParserKind::Csv => &[
                ParseOption::ErrorMode,
                ParseOption::Delimiter,
                ParseOption::Fields,
            ],
        }
    }

    /// Build a parser of this kind from the options it accepts
    pub fn build(self, options: &ParseOptions) -> Result<Box<dyn DatasetParser>> {
        let options = options.restricted_to(self);
        options.validate()?;

        Ok(match self {
            ParserKind::Plain => Box::new(PlainParser::new(options)),
            ParserKind::Json => Box::new(JsonParser::new(options)),
            ParserKind::Regex => Box::new(PatternParser::new(options)?),
            ParserKind::Csv => Box::new(DelimitedParser::new(options)),
        })
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "unknown parser '{}', expected one of: plain, json, regex, csv",
                    s
                ))
            })
    }
}

/// Outcome of a problem that the error mode decided not to raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recovery {
    /// Keep the slot as a placeholder
    Placeholder,
    /// Drop the slot entirely
    Omit,
}

/// Raise `error` unless `mode` is silent, in which case recover with `recovery`
pub(crate) fn unless_silent(mode: ErrorMode, error: Error, recovery: Recovery) -> Result<Recovery> {
    match mode {
        ErrorMode::Silent => Ok(recovery),
        ErrorMode::Strict | ErrorMode::Lenient => Err(error),
    }
}
