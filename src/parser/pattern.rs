//! Regular expression parser
//!
//! Each non-empty line is matched against one pattern. The named groups
//! `sys`, `dia` and `pulse` supply the core values; any other named group
//! (`date`, `time`, ...) is attached to the measurement as an extra.

use super::{DatasetParser, ParserKind, Recovery, unless_silent};
use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::models::{Dataset, Field, Measurement, Slot};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PatternParser {
    options: ParseOptions,
    regex: Regex,
    extra_groups: Vec<String>,
}

impl PatternParser {
    /// Compile the configured pattern
    pub fn new(options: ParseOptions) -> Result<Self> {
        let regex = Regex::new(&options.pattern).map_err(|e| {
            Error::configuration(format!("invalid pattern '{}': {}", options.pattern, e))
        })?;

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        for field in Field::ALL {
            if !names.contains(&field.name()) {
                warn!(
                    "Pattern has no '{}' group; matching lines cannot be turned into measurements",
                    field
                );
            }
        }

        let extra_groups = names
            .iter()
            .filter(|name| Field::from_name(name).is_none())
            .map(|name| name.to_string())
            .collect();

        Ok(Self {
            options,
            regex,
            extra_groups,
        })
    }

    /// Parse one trimmed, non-empty line
    pub fn parse_line(&self, line: &str) -> Result<Slot> {
        let Some(captures) = self.regex.captures(line) else {
            return self.recover(Error::no_match(line));
        };

        let group = |field: Field| captures.name(field.name()).map(|m| m.as_str());
        let (Some(sys), Some(dia), Some(pulse)) =
            (group(Field::Sys), group(Field::Dia), group(Field::Pulse))
        else {
            let found = Field::ALL.iter().filter(|f| group(**f).is_some()).count();
            return self.recover(Error::token_shape(line, Field::ALL.len(), found));
        };

        let measurement = match Measurement::parse(sys, dia, pulse) {
            Ok(measurement) => measurement,
            Err(error) => return self.recover(error),
        };

        let measurement = self.extra_groups.iter().fold(measurement, |m, name| {
            let value = captures
                .name(name)
                .map_or(Value::Null, |g| Value::from(g.as_str()));
            m.with_extra(name.clone(), value)
        });
        Ok(Some(measurement))
    }

    fn recover(&self, error: Error) -> Result<Slot> {
        unless_silent(self.options.error_mode, error, Recovery::Placeholder).map(|_| None)
    }
}

impl DatasetParser for PatternParser {
    fn parse(&self, lines: &mut dyn Iterator<Item = String>) -> Result<Dataset> {
        let mut slots = Vec::new();
        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            slots.push(self.parse_line(line)?);
        }

        debug!("Regex parser read {} slot(s)", slots.len());
        Ok(Dataset::Flat(slots))
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Regex
    }
}
