//! Core data structures for blood pressure processing.
//!
//! Defines the [`Measurement`] record, the [`Slot`] placeholder convention
//! and the [`Dataset`] shape handed from a parser to the statistics engine.

use crate::error::{Error, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// The three measured quantities of a blood pressure reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Sys,
    Dia,
    Pulse,
}

impl Field {
    /// All fields in display order
    pub const ALL: [Field; 3] = [Field::Sys, Field::Dia, Field::Pulse];

    pub fn name(self) -> &'static str {
        match self {
            Field::Sys => "sys",
            Field::Dia => "dia",
            Field::Pulse => "pulse",
        }
    }

    /// Position of the field in [`Field::ALL`]
    pub fn index(self) -> usize {
        match self {
            Field::Sys => 0,
            Field::Dia => 1,
            Field::Pulse => 2,
        }
    }

    /// Look up a field by its name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single blood pressure measurement
///
/// `sys` (systolic) and `dia` (diastolic) are in mm Hg, `pulse` in beats per
/// minute. Any number of extra attributes (date, time, flags for irregular
/// heartbeat, ...) can be attached; they keep their insertion order and do
/// not take part in statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    sys: i32,
    dia: i32,
    pulse: i32,
    extras: Map<String, Value>,
}

impl Measurement {
    pub fn new(sys: i32, dia: i32, pulse: i32) -> Self {
        Self {
            sys,
            dia,
            pulse,
            extras: Map::new(),
        }
    }

    /// Build a measurement from text values, e.g. the parts of `"136/83/65"`
    pub fn parse(sys: &str, dia: &str, pulse: &str) -> Result<Self> {
        Ok(Self::new(
            coerce_text(Field::Sys, sys)?,
            coerce_text(Field::Dia, dia)?,
            coerce_text(Field::Pulse, pulse)?,
        ))
    }

    /// Build a measurement from JSON values (numbers or numeric strings)
    pub fn from_values(sys: &Value, dia: &Value, pulse: &Value) -> Result<Self> {
        Ok(Self::new(
            coerce_value(Field::Sys, sys)?,
            coerce_value(Field::Dia, dia)?,
            coerce_value(Field::Pulse, pulse)?,
        ))
    }

    /// Build a measurement from a map of named attributes
    ///
    /// The core fields must be present; every other key becomes an extra in
    /// map order.
    pub fn from_dict(dict: &Map<String, Value>) -> Result<Self> {
        let core = |field: Field| {
            dict.get(field.name()).ok_or_else(|| {
                Error::malformed_document(format!("object is missing the '{}' key", field))
            })
        };

        let mut measurement =
            Self::from_values(core(Field::Sys)?, core(Field::Dia)?, core(Field::Pulse)?)?;
        for (key, value) in dict {
            if Field::from_name(key).is_none() {
                measurement.extras.insert(key.clone(), value.clone());
            }
        }
        Ok(measurement)
    }

    /// Attach an extra attribute
    ///
    /// Keys naming a core field are ignored; core values are fixed at
    /// construction.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if Field::from_name(&key).is_none() {
            self.extras.insert(key, value.into());
        }
        self
    }

    pub fn sys(&self) -> i32 {
        self.sys
    }

    pub fn dia(&self) -> i32 {
        self.dia
    }

    pub fn pulse(&self) -> i32 {
        self.pulse
    }

    pub fn get(&self, field: Field) -> i32 {
        match field {
            Field::Sys => self.sys,
            Field::Dia => self.dia,
            Field::Pulse => self.pulse,
        }
    }

    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    pub fn as_tuple(&self) -> (i32, i32, i32) {
        (self.sys, self.dia, self.pulse)
    }

    /// All attributes as an ordered map: core fields first, then extras
    pub fn as_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("sys".to_string(), Value::from(self.sys));
        dict.insert("dia".to_string(), Value::from(self.dia));
        dict.insert("pulse".to_string(), Value::from(self.pulse));
        dict.extend(self.extras.iter().map(|(k, v)| (k.clone(), v.clone())));
        dict
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:3}/{:3}/{:3}", self.sys, self.dia, self.pulse)
    }
}

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.extras.len()))?;
        map.serialize_entry("sys", &self.sys)?;
        map.serialize_entry("dia", &self.dia)?;
        map.serialize_entry("pulse", &self.pulse)?;
        for (key, value) in &self.extras {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Coerce a text value to an integer, ignoring surrounding whitespace
pub fn coerce_text(field: Field, text: &str) -> Result<i32> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| Error::value_conversion(field.name(), text))
}

/// Coerce a JSON value to an integer
///
/// Floats are truncated toward zero; strings must hold an integer.
pub fn coerce_value(field: Field, value: &Value) -> Result<i32> {
    let converted = match value {
        Value::Number(number) => match number.as_i64() {
            Some(int) => i32::try_from(int).ok(),
            None => number
                .as_f64()
                .map(f64::trunc)
                .filter(|f| f.is_finite() && *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
                .map(|f| f as i32),
        },
        Value::String(text) => return coerce_text(field, text),
        _ => None,
    };

    converted.ok_or_else(|| Error::value_conversion(field.name(), value.to_string()))
}

/// One expected measurement position; `None` is the placeholder
pub type Slot = Option<Measurement>;

/// The result of one parser invocation
///
/// Either a flat sequence of slots, or one sequence per source line when the
/// parser was asked to keep line alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Dataset {
    Flat(Vec<Slot>),
    Aligned(Vec<Vec<Slot>>),
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset::Flat(Vec::new())
    }
}

impl Dataset {
    pub fn is_aligned(&self) -> bool {
        matches!(self, Dataset::Aligned(_))
    }

    /// Iterate over every slot in order, flattening line alignment
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Slot> + '_> {
        match self {
            Dataset::Flat(slots) => Box::new(slots.iter()),
            Dataset::Aligned(lines) => Box::new(lines.iter().flatten()),
        }
    }

    /// Total number of slots, placeholders included
    pub fn len(&self) -> usize {
        match self {
            Dataset::Flat(slots) => slots.len(),
            Dataset::Aligned(lines) => lines.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of source lines represented (aligned datasets only)
    pub fn line_count(&self) -> Option<usize> {
        match self {
            Dataset::Flat(_) => None,
            Dataset::Aligned(lines) => Some(lines.len()),
        }
    }

    /// Render to JSON, mapping each measurement with `render` and each
    /// placeholder to `null`; aligned datasets stay nested
    pub fn to_json_with<F>(&self, render: F) -> Value
    where
        F: Fn(&Measurement) -> Value,
    {
        let slot = |slot: &Slot| slot.as_ref().map_or(Value::Null, &render);
        match self {
            Dataset::Flat(slots) => Value::Array(slots.iter().map(slot).collect()),
            Dataset::Aligned(lines) => Value::Array(
                lines
                    .iter()
                    .map(|line| Value::Array(line.iter().map(slot).collect()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_measurement_tuple_and_dict() {
        let m = Measurement::new(123, 83, 65);
        assert_eq!(m.as_tuple(), (123, 83, 65));
        assert_eq!(
            Value::Object(m.as_dict()),
            json!({"sys": 123, "dia": 83, "pulse": 65})
        );

        let m = Measurement::new(132, 86, 72).with_extra("date", "2013-01-23");
        assert_eq!(m.as_tuple(), (132, 86, 72));
        assert_eq!(
            Value::Object(m.as_dict()),
            json!({"sys": 132, "dia": 86, "pulse": 72, "date": "2013-01-23"})
        );
    }

    #[test]
    fn test_parse_trims_and_rejects_non_integers() {
        let m = Measurement::parse(" 136", "83 ", " 65 ").unwrap();
        assert_eq!(m.as_tuple(), (136, 83, 65));

        match Measurement::parse("136", "83", "e65").unwrap_err() {
            Error::ValueConversion { field, value } => {
                assert_eq!(field, "pulse");
                assert_eq!(value, "e65");
            }
            other => panic!("Expected ValueConversion error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_values_coercion() {
        let m = Measurement::from_values(&json!(120), &json!("80"), &json!(70.9)).unwrap();
        assert_eq!(m.as_tuple(), (120, 80, 70));

        assert!(Measurement::from_values(&json!(true), &json!(80), &json!(70)).is_err());
        assert!(Measurement::from_values(&json!(120), &json!(null), &json!(70)).is_err());
        assert!(Measurement::from_values(&json!(120), &json!(80), &json!("7o")).is_err());
    }

    #[test]
    fn test_from_dict_keeps_extras_in_order() {
        let dict = json!({"time": "08:15", "sys": 128, "dia": 84, "pulse": 61, "date": "2013-02-01"});
        let m = Measurement::from_dict(dict.as_object().unwrap()).unwrap();

        assert_eq!(m.as_tuple(), (128, 84, 61));
        let keys: Vec<&str> = m.extras().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["time", "date"]);
    }

    #[test]
    fn test_from_dict_requires_core_fields() {
        let dict = json!({"sys": 128, "pulse": 61});
        let err = Measurement::from_dict(dict.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_core_fields_cannot_be_overridden_by_extras() {
        let m = Measurement::new(120, 80, 70).with_extra("sys", 999);
        assert_eq!(m.sys(), 120);
        assert!(m.extras().is_empty());
    }

    #[test]
    fn test_display_pads_values() {
        let m = Measurement::new(99, 61, 7);
        assert_eq!(m.to_string(), " 99/ 61/  7");
    }

    #[test]
    fn test_serialize_core_first() {
        let m = Measurement::new(125, 79, 68)
            .with_extra("date", "2013-01-02")
            .with_extra("time", "13:12");
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(
            json,
            r#"{"sys":125,"dia":79,"pulse":68,"date":"2013-01-02","time":"13:12"}"#
        );
    }

    #[test]
    fn test_dataset_flattening() {
        let m = Measurement::new(120, 80, 70);
        let aligned = Dataset::Aligned(vec![
            vec![Some(m.clone()), None],
            vec![],
            vec![None, Some(m.clone())],
        ]);

        assert!(aligned.is_aligned());
        assert_eq!(aligned.len(), 4);
        assert_eq!(aligned.line_count(), Some(3));
        assert_eq!(aligned.iter().filter(|slot| slot.is_none()).count(), 2);

        let rendered = aligned.to_json_with(|m| json!(m.sys()));
        assert_eq!(rendered, json!([[120, null], [], [null, 120]]));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::from_name("dia"), Some(Field::Dia));
        assert_eq!(Field::from_name("date"), None);
        let names: Vec<String> = Field::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["sys", "dia", "pulse"]);
    }
}
