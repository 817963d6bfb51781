//! Delimited-field (CSV-like) parser
//!
//! Each non-empty line is one record. Values are mapped positionally onto
//! the configured field names; surplus values are collected into a single
//! `extra` list and missing trailing values are absent.
//!
//! ```text
//! fields = date,time,sys,dia,pulse
//! 2013-01-02,13:12,125,79,68,irregular
//! ```

use super::{DatasetParser, ParserKind, Recovery, unless_silent};
use crate::config::ParseOptions;
use crate::constants::EXTRA_BUCKET;
use crate::error::{Error, Result};
use crate::models::{Dataset, Field, Measurement, Slot};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DelimitedParser {
    options: ParseOptions,
}

impl DelimitedParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse one trimmed, non-empty record
    pub fn parse_record(&self, line: &str) -> Result<Slot> {
        let fields = &self.options.fields;
        let values: Vec<&str> = line
            .split(self.options.delimiter.as_str())
            .map(str::trim)
            .collect();

        let mut core: [Option<&str>; 3] = [None; 3];
        let mut extras: Vec<(String, Value)> = Vec::new();
        for (position, name) in fields.iter().enumerate() {
            let value = values.get(position).copied();
            match Field::from_name(name) {
                Some(field) => core[field.index()] = value,
                None => extras.push((name.clone(), value.map_or(Value::Null, Value::from))),
            }
        }
        if values.len() > fields.len() {
            let surplus = values[fields.len()..].iter().map(|v| Value::from(*v));
            extras.push((EXTRA_BUCKET.to_string(), Value::Array(surplus.collect())));
        }

        let [Some(sys), Some(dia), Some(pulse)] = core else {
            return self.recover(Error::missing_slot(line, fields.len(), values.len()));
        };

        match Measurement::parse(sys, dia, pulse) {
            Ok(measurement) => Ok(Some(
                extras
                    .into_iter()
                    .fold(measurement, |m, (key, value)| m.with_extra(key, value)),
            )),
            Err(error) => self.recover(error),
        }
    }

    fn recover(&self, error: Error) -> Result<Slot> {
        unless_silent(self.options.error_mode, error, Recovery::Placeholder).map(|_| None)
    }
}

impl DatasetParser for DelimitedParser {
    fn parse(&self, lines: &mut dyn Iterator<Item = String>) -> Result<Dataset> {
        let mut slots = Vec::new();
        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            slots.push(self.parse_record(line)?);
        }

        debug!(
            "Delimited parser read {} record(s) into fields {:?}",
            slots.len(),
            self.options.fields
        );
        Ok(Dataset::Flat(slots))
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Csv
    }
}
