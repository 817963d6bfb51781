//! Plain-text parser for `sys/dia/pulse` tokens
//!
//! Each line holds one or more tokens split by the delimiter (default `,`);
//! each token holds three values split by the separator (default `/`):
//!
//! ```text
//! 136/83/65, 132/82/70
//! 144/82/86, -
//! ```
//!
//! With `max_entries` set, exactly that many slots are produced per line and
//! gaps are filled with placeholders.

use super::{DatasetParser, ParserKind, Recovery, unless_silent};
use crate::config::{ErrorMode, ParseOptions};
use crate::constants::VALUES_PER_TOKEN;
use crate::error::{Error, Result};
use crate::models::{Dataset, Measurement, Slot};
use tracing::{debug, trace};

/// Why a slot did not produce a measurement
#[derive(Debug)]
enum SlotFault<'a> {
    /// The line has fewer tokens than the configured cap
    Missing { found: usize },
    /// Skip marker, or an empty last token left by a trailing delimiter
    Skipped { token: &'a str, found: usize },
    /// Wrong number of values in the token
    Shape { token: &'a str, found: usize },
    /// Three values, but not all of them integers
    Value(Error),
}

#[derive(Debug, Clone)]
pub struct PlainParser {
    options: ParseOptions,
}

impl PlainParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse one trimmed, non-empty line into its slots
    pub fn parse_line(&self, line: &str) -> Result<Vec<Slot>> {
        let tokens: Vec<&str> = line.split(self.options.delimiter.as_str()).collect();
        let slot_count = match self.options.max_entries {
            0 => tokens.len(),
            cap => cap,
        };

        let mut slots = Vec::with_capacity(slot_count);
        for index in 0..slot_count {
            match self.classify(&tokens, index) {
                Ok(measurement) => slots.push(Some(measurement)),
                Err(fault) => {
                    if self.resolve(fault, line)? == Recovery::Placeholder {
                        slots.push(None);
                    }
                }
            }
        }
        Ok(slots)
    }

    fn classify<'a>(
        &self,
        tokens: &[&'a str],
        index: usize,
    ) -> std::result::Result<Measurement, SlotFault<'a>> {
        let Some(raw) = tokens.get(index) else {
            return Err(SlotFault::Missing {
                found: tokens.len(),
            });
        };

        let token = raw.trim();
        let values: Vec<&str> = token.split(self.options.separator.as_str()).collect();
        if values.len() != VALUES_PER_TOKEN {
            let found = values.len();
            let is_skip_marker =
                !self.options.skip_marker.is_empty() && token == self.options.skip_marker;
            // Only the last token may be blank: "1/2/3," ends with a delimiter
            let is_trailing_blank = token.is_empty() && index + 1 == tokens.len();

            return Err(if is_skip_marker || is_trailing_blank {
                SlotFault::Skipped { token, found }
            } else {
                SlotFault::Shape { token, found }
            });
        }

        Measurement::parse(values[0], values[1], values[2]).map_err(SlotFault::Value)
    }

    fn resolve(&self, fault: SlotFault<'_>, line: &str) -> Result<Recovery> {
        let mode = self.options.error_mode;
        let cap = self.options.max_entries;
        let tolerated = if cap > 0 {
            Recovery::Placeholder
        } else {
            Recovery::Omit
        };

        match fault {
            SlotFault::Missing { found } => match mode {
                ErrorMode::Strict => Err(Error::missing_slot(line, cap, found)),
                ErrorMode::Lenient | ErrorMode::Silent => Ok(Recovery::Placeholder),
            },
            SlotFault::Skipped { token, found } => match mode {
                ErrorMode::Strict => Err(Error::token_shape(token, VALUES_PER_TOKEN, found)),
                ErrorMode::Lenient | ErrorMode::Silent => {
                    trace!("Skipped token '{}' on line '{}'", token, line);
                    Ok(tolerated)
                }
            },
            SlotFault::Shape { token, found } => unless_silent(
                mode,
                Error::token_shape(token, VALUES_PER_TOKEN, found),
                tolerated,
            ),
            SlotFault::Value(error) => unless_silent(mode, error, tolerated),
        }
    }
}

impl DatasetParser for PlainParser {
    fn parse(&self, lines: &mut dyn Iterator<Item = String>) -> Result<Dataset> {
        let cap = self.options.max_entries;
        let mut flat: Vec<Slot> = Vec::new();
        let mut aligned: Vec<Vec<Slot>> = Vec::new();
        let mut lines_read = 0usize;

        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                if !self.options.keep_empty_lines {
                    continue;
                }
                if self.options.align_by_line {
                    aligned.push(Vec::new());
                } else {
                    flat.extend((0..cap).map(|_| None));
                }
                continue;
            }

            lines_read += 1;
            let slots = self.parse_line(line)?;
            if self.options.align_by_line {
                aligned.push(slots);
            } else {
                flat.extend(slots);
            }
        }

        let dataset = if self.options.align_by_line {
            Dataset::Aligned(aligned)
        } else {
            Dataset::Flat(flat)
        };
        debug!(
            "Plain parser read {} slot(s) from {} line(s)",
            dataset.len(),
            lines_read
        );
        Ok(dataset)
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Plain
    }
}
