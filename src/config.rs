//! Configuration structures for parsing, export and chart rendering.
//!
//! Every parser reads its settings from one shared [`ParseOptions`] value.
//! Each parser only declares a subset of those options (see
//! [`ParserKind::accepted_options`]); [`ParseOptions::restricted_to`] drops
//! the rest before a parser is built.

use crate::constants::{
    DEFAULT_CHART_FILENAME, DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_CSV_FIELDS,
    DEFAULT_DELIMITER, DEFAULT_PATTERN, DEFAULT_SEPARATOR, DEFAULT_SKIP_MARKER, EXTRA_BUCKET,
    MIN_CHART_DIMENSION,
};
use crate::error::{Error, Result};
use crate::models::Field;
use crate::parser::ParserKind;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// How a parser reacts to input it cannot turn into a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ErrorMode {
    /// Every malformed, skipped or missing entry aborts parsing
    Strict,
    /// Skip markers, trailing empty tokens and missing slots become
    /// placeholders; malformed entries still abort
    #[default]
    Lenient,
    /// Nothing aborts parsing
    Silent,
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorMode::Strict => "strict",
            ErrorMode::Lenient => "lenient",
            ErrorMode::Silent => "silent",
        })
    }
}

/// Names of the individual parser options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseOption {
    ErrorMode,
    MaxEntries,
    SkipMarker,
    Separator,
    Delimiter,
    AlignByLine,
    KeepEmptyLines,
    AsObject,
    Pattern,
    Fields,
}

impl ParseOption {
    /// Command line spelling of the option
    pub fn flag(self) -> &'static str {
        match self {
            ParseOption::ErrorMode => "--error-mode",
            ParseOption::MaxEntries => "--entries",
            ParseOption::SkipMarker => "--skip",
            ParseOption::Separator => "--separator",
            ParseOption::Delimiter => "--delimiter",
            ParseOption::AlignByLine => "--align",
            ParseOption::KeepEmptyLines => "--keep-empty",
            ParseOption::AsObject => "--as-object",
            ParseOption::Pattern => "--pattern",
            ParseOption::Fields => "--fields",
        }
    }
}

/// Settings shared by all parsers
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub error_mode: ErrorMode,

    /// Slots consumed per line; 0 = every token on the line
    pub max_entries: usize,

    /// A token consisting solely of this string is an intentional gap
    pub skip_marker: String,

    /// Splits a token into sys, dia and pulse
    pub separator: String,

    /// Splits a line into tokens, or a record into values
    pub delimiter: String,

    /// Return one group of slots per source line
    pub align_by_line: bool,

    /// Keep empty lines instead of skipping them
    pub keep_empty_lines: bool,

    /// JSON elements are objects instead of `[sys, dia, pulse]` arrays
    pub as_object: bool,

    /// Regular expression with `sys`, `dia` and `pulse` named groups
    pub pattern: String,

    /// Field names for delimited records, in column order
    pub fields: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::default(),
            max_entries: 0,
            skip_marker: DEFAULT_SKIP_MARKER.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            align_by_line: false,
            keep_empty_lines: false,
            as_object: false,
            pattern: DEFAULT_PATTERN.to_string(),
            fields: DEFAULT_CSV_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl ParseOptions {
    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    /// Cap the number of slots per line (0 = unlimited)
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_skip_marker(mut self, skip_marker: impl Into<String>) -> Self {
        self.skip_marker = skip_marker.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_align_by_line(mut self) -> Self {
        self.align_by_line = true;
        self
    }

    pub fn with_keep_empty_lines(mut self) -> Self {
        self.keep_empty_lines = true;
        self
    }

    pub fn with_objects(mut self) -> Self {
        self.as_object = true;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Keep only the options `kind` declares, resetting the rest to defaults
    ///
    /// Dropping a non-default value is logged, since it usually means an
    /// option was given to the wrong parser.
    pub fn restricted_to(&self, kind: ParserKind) -> Self {
        let defaults = Self::default();
        let mut restricted = Self::default();
        let accepted = kind.accepted_options();

        for option in ALL_OPTIONS {
            if accepted.contains(option) {
                restricted.copy_option(self, *option);
            } else if self.differs(&defaults, *option) {
                warn!(
                    "Option {} is ignored by the {} parser",
                    option.flag(),
                    kind
                );
            }
        }

        debug!("Options for {} parser: {:?}", kind, restricted);
        restricted
    }

    /// Check option values for consistency
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::configuration("separator must not be empty"));
        }
        if self.delimiter.is_empty() {
            return Err(Error::configuration("delimiter must not be empty"));
        }

        for field in Field::ALL {
            let count = self.fields.iter().filter(|f| *f == field.name()).count();
            if count != 1 {
                return Err(Error::configuration(format!(
                    "fields must name '{}' exactly once, found {} time(s) in {:?}",
                    field, count, self.fields
                )));
            }
        }
        if self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::configuration("field names must not be empty"));
        }
        if self.fields.iter().any(|f| f == EXTRA_BUCKET) {
            return Err(Error::configuration(format!(
                "'{}' is reserved for surplus values and cannot be a field name",
                EXTRA_BUCKET
            )));
        }

        Ok(())
    }

    fn copy_option(&mut self, from: &Self, option: ParseOption) {
        match option {
            ParseOption::ErrorMode => self.error_mode = from.error_mode,
            ParseOption::MaxEntries => self.max_entries = from.max_entries,
            ParseOption::SkipMarker => self.skip_marker = from.skip_marker.clone(),
            ParseOption::Separator => self.separator = from.separator.clone(),
            ParseOption::Delimiter => self.delimiter = from.delimiter.clone(),
            ParseOption::AlignByLine => self.align_by_line = from.align_by_line,
            ParseOption::KeepEmptyLines => self.keep_empty_lines = from.keep_empty_lines,
            ParseOption::AsObject => self.as_object = from.as_object,
            ParseOption::Pattern => self.pattern = from.pattern.clone(),
            ParseOption::Fields => self.fields = from.fields.clone(),
        }
    }

    fn differs(&self, other: &Self, option: ParseOption) -> bool {
        match option {
            ParseOption::ErrorMode => self.error_mode != other.error_mode,
            ParseOption::MaxEntries => self.max_entries != other.max_entries,
            ParseOption::SkipMarker => self.skip_marker != other.skip_marker,
            ParseOption::Separator => self.separator != other.separator,
            ParseOption::Delimiter => self.delimiter != other.delimiter,
            ParseOption::AlignByLine => self.align_by_line != other.align_by_line,
            ParseOption::KeepEmptyLines => self.keep_empty_lines != other.keep_empty_lines,
            ParseOption::AsObject => self.as_object != other.as_object,
            ParseOption::Pattern => self.pattern != other.pattern,
            ParseOption::Fields => self.fields != other.fields,
        }
    }
}

const ALL_OPTIONS: &[ParseOption] = &[
    ParseOption::ErrorMode,
    ParseOption::MaxEntries,
    ParseOption::SkipMarker,
    ParseOption::Separator,
    ParseOption::Delimiter,
    ParseOption::AlignByLine,
    ParseOption::KeepEmptyLines,
    ParseOption::AsObject,
    ParseOption::Pattern,
    ParseOption::Fields,
];

/// JSON output formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    /// Pretty print with this many spaces; 0 = newlines without indent
    pub indent: Option<usize>,

    /// Use `,` and `:` without trailing spaces
    pub compact: bool,

    /// Sort object keys
    pub sort_keys: bool,
}

/// Line chart rendering settings
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub filename: PathBuf,

    /// Render a raster image instead of SVG
    pub png: bool,

    /// Light background instead of the default dark one
    pub light: bool,

    /// Mark each value with a dot
    pub dots: bool,

    /// Connect values with lines
    pub lines: bool,

    /// Fill the area between the floor and each line
    pub fill: bool,

    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            filename: PathBuf::from(DEFAULT_CHART_FILENAME),
            png: false,
            light: false,
            dots: true,
            lines: true,
            fill: false,
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
        }
    }
}

impl ChartOptions {
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Output path, switching a `.svg` extension to `.png` for raster output
    pub fn output_path(&self) -> PathBuf {
        let is_svg = self
            .filename
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if self.png && is_svg {
            self.filename.with_extension("png")
        } else {
            self.filename.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_CHART_DIMENSION || self.height < MIN_CHART_DIMENSION {
            return Err(Error::configuration(format!(
                "chart size {}x{} is too small (minimum {}x{})",
                self.width, self.height, MIN_CHART_DIMENSION, MIN_CHART_DIMENSION
            )));
        }
        if self.filename.as_os_str().is_empty() {
            return Err(Error::configuration("chart filename must not be empty"));
        }
        Ok(())
    }
}
