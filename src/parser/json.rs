//! JSON array parser
//!
//! The whole input is buffered and parsed as a single document:
//!
//! ```text
//! [[136, 83, 65], [132, 82, 70], null]
//! [{"sys": 136, "dia": 83, "pulse": 65, "date": "2013-01-02"}]
//! ```
//!
//! `null` elements become placeholders, so the output of the JSON exporter
//! can be read back.

use super::{DatasetParser, ParserKind};
use crate::config::{ErrorMode, ParseOptions};
use crate::constants::VALUES_PER_TOKEN;
use crate::error::{Error, Result};
use crate::models::{Dataset, Measurement, Slot};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct JsonParser {
    options: ParseOptions,
}

impl JsonParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse a complete JSON document
    ///
    /// Whitespace-only input yields an empty dataset.
    pub fn parse_document(&self, text: &str) -> Result<Dataset> {
        if text.trim().is_empty() {
            return Ok(Dataset::default());
        }

        let document: Value = serde_json::from_str(text)
            .map_err(|e| Error::malformed_document(format!("invalid JSON: {}", e)))?;
        let Value::Array(elements) = document else {
            return Err(Error::malformed_document(format!(
                "expected an array, found {}",
                describe(&document)
            )));
        };

        elements
            .iter()
            .enumerate()
            .map(|(index, element)| self.parse_element(index, element))
            .collect::<Result<Vec<Slot>>>()
            .map(Dataset::Flat)
    }

    fn parse_element(&self, index: usize, element: &Value) -> Result<Slot> {
        match element {
            Value::Null => Ok(None),
            Value::Array(values) if !self.options.as_object => {
                if values.len() != VALUES_PER_TOKEN {
                    return Err(Error::malformed_document(format!(
                        "element {}: expected {} values, found {}",
                        index,
                        VALUES_PER_TOKEN,
                        values.len()
                    )));
                }
                Measurement::from_values(&values[0], &values[1], &values[2]).map(Some)
            }
            Value::Object(dict) if self.options.as_object => Measurement::from_dict(dict).map(Some),
            other => {
                let expected = if self.options.as_object {
                    "an object"
                } else {
                    "an array"
                };
                Err(Error::malformed_document(format!(
                    "element {}: expected {}, found {}",
                    index,
                    expected,
                    describe(other)
                )))
            }
        }
    }
}

impl DatasetParser for JsonParser {
    fn parse(&self, lines: &mut dyn Iterator<Item = String>) -> Result<Dataset> {
        let text = lines.collect::<Vec<String>>().join("\n");
        debug!("JSON parser buffered {} byte(s)", text.len());

        match self.parse_document(&text) {
            Err(error) if self.options.error_mode == ErrorMode::Silent => {
                warn!("Ignoring unparsable JSON input: {}", error);
                Ok(Dataset::default())
            }
            result => result,
        }
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Json
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
