//! JSON export of datasets and statistics
//!
//! Three renderings are available:
//!
//! - [`tuples_json`] - `[[sys, dia, pulse], null, ...]`
//! - [`objects_json`] - `[{"sys": .., "dia": .., "pulse": .., extras..}, ...]`
//! - [`stats_json`] - the full [`StatisticExport`](crate::statistic::StatisticExport)
//!
//! Placeholders are written as `null` and aligned datasets stay nested.
//! Output layout follows [`ExportOptions`]: single line with `", "` and
//! `": "` separators by default, `","` and `":"` when compact, one value per
//! line when an indent is set.

use crate::config::ExportOptions;
use crate::error::Result;
use crate::models::Dataset;
use crate::statistic::Statistic;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value, json};
use std::io;

/// Measurements as `[sys, dia, pulse]` arrays
pub fn tuples_json(dataset: &Dataset, options: &ExportOptions) -> Result<String> {
    let value = dataset.to_json_with(|m| json!([m.sys(), m.dia(), m.pulse()]));
    render(value, options)
}

/// Measurements as objects, core fields first, then extras
pub fn objects_json(dataset: &Dataset, options: &ExportOptions) -> Result<String> {
    let value = dataset.to_json_with(|m| Value::Object(m.as_dict()));
    render(value, options)
}

/// Dataset, series and summaries as one object
pub fn stats_json(statistic: &Statistic, options: &ExportOptions) -> Result<String> {
    to_json_string(&statistic.export(), options)
}

/// Serialize any value with the configured layout
pub fn to_json_string<T: Serialize>(value: &T, options: &ExportOptions) -> Result<String> {
    render(serde_json::to_value(value)?, options)
}

fn render(value: Value, options: &ExportOptions) -> Result<String> {
    let value = if options.sort_keys {
        sorted(value)
    } else {
        value
    };

    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, LayoutFormatter::new(options));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Recursively order object keys
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sorted(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Writes separators and indentation per [`ExportOptions`]
///
/// With an indent, the item separator loses its trailing space so lines
/// carry no trailing whitespace.
struct LayoutFormatter {
    item_separator: &'static [u8],
    key_separator: &'static [u8],
    indent: Option<Vec<u8>>,
    depth: usize,
    has_value: bool,
}

impl LayoutFormatter {
    fn new(options: &ExportOptions) -> Self {
        let (item_separator, key_separator): (&[u8], &[u8]) = match (options.compact, options.indent)
        {
            (true, _) => (b",", b":"),
            (false, Some(_)) => (b",", b": "),
            (false, None) => (b", ", b": "),
        };
        Self {
            item_separator,
            key_separator,
            indent: options.indent.map(|width| vec![b' '; width]),
            depth: 0,
            has_value: false,
        }
    }

    fn newline<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(indent) = &self.indent {
            writer.write_all(b"\n")?;
            for _ in 0..self.depth {
                writer.write_all(indent)?;
            }
        }
        Ok(())
    }

    fn begin_nested<W: ?Sized + io::Write>(&mut self, writer: &mut W, open: &[u8]) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(open)
    }

    fn end_nested<W: ?Sized + io::Write>(&mut self, writer: &mut W, close: &[u8]) -> io::Result<()> {
        self.depth -= 1;
        if self.has_value {
            self.newline(writer)?;
        }
        writer.write_all(close)
    }

    fn begin_item<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if !first {
            writer.write_all(self.item_separator)?;
        }
        self.newline(writer)
    }
}

impl Formatter for LayoutFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.begin_nested(writer, b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.end_nested(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.begin_item(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.begin_nested(writer, b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.end_nested(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.begin_item(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.key_separator)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;

    fn dataset() -> Dataset {
        Dataset::Flat(vec![
            Some(Measurement::new(136, 83, 65).with_extra("date", "2013-01-02")),
            None,
        ])
    }

    #[test]
    fn test_tuples_default_separators() {
        let text = tuples_json(&dataset(), &ExportOptions::default()).unwrap();
        assert_eq!(text, "[[136, 83, 65], null]");
    }

    #[test]
    fn test_objects_compact() {
        let options = ExportOptions {
            compact: true,
            ..ExportOptions::default()
        };
        let text = objects_json(&dataset(), &options).unwrap();
        assert_eq!(
            text,
            r#"[{"sys":136,"dia":83,"pulse":65,"date":"2013-01-02"},null]"#
        );
    }

    #[test]
    fn test_sorted_keys() {
        let options = ExportOptions {
            sort_keys: true,
            ..ExportOptions::default()
        };
        let text = objects_json(&dataset(), &options).unwrap();
        assert_eq!(
            text,
            r#"[{"date": "2013-01-02", "dia": 83, "pulse": 65, "sys": 136}, null]"#
        );
    }

    #[test]
    fn test_indent() {
        let options = ExportOptions {
            indent: Some(2),
            ..ExportOptions::default()
        };
        let text = tuples_json(&dataset(), &options).unwrap();
        assert_eq!(
            text,
            "[\n  [\n    136,\n    83,\n    65\n  ],\n  null\n]"
        );
    }

    #[test]
    fn test_zero_indent_keeps_newlines() {
        let options = ExportOptions {
            indent: Some(0),
            ..ExportOptions::default()
        };
        let text = tuples_json(&Dataset::Flat(vec![None, None]), &options).unwrap();
        assert_eq!(text, "[\nnull,\nnull\n]");
    }

    #[test]
    fn test_empty_containers() {
        let options = ExportOptions {
            indent: Some(4),
            ..ExportOptions::default()
        };
        let text = tuples_json(&Dataset::Aligned(vec![vec![]]), &options).unwrap();
        assert_eq!(text, "[\n    []\n]");
        assert_eq!(
            tuples_json(&Dataset::default(), &ExportOptions::default()).unwrap(),
            "[]"
        );
    }

    #[test]
    fn test_stats_json_is_ordered() {
        let stats = Statistic::new(Dataset::Flat(vec![Some(Measurement::new(120, 80, 70))]));
        let options = ExportOptions {
            compact: true,
            ..ExportOptions::default()
        };
        let text = stats_json(&stats, &options).unwrap();
        assert!(text.starts_with(r#"{"data":[{"sys":120,"dia":80,"pulse":70}],"sys":[120],"#));
        assert!(text.ends_with(r#""pulse_avg":70,"skipped":0}"#));
    }
}
