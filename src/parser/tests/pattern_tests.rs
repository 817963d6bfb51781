//! Tests for the regular expression parser

use super::{parse, slots};
use crate::config::{ErrorMode, ParseOptions};
use crate::error::Error;
use crate::parser::ParserKind;
use serde_json::{Value, json};

#[test]
fn test_default_pattern_extracts_date_and_time() {
    let dataset = parse(
        ParserKind::Regex,
        ParseOptions::default(),
        &["2013-01-02 13:12 125/79/68"],
    )
    .unwrap();

    let measurement = dataset.iter().flatten().next().unwrap();
    assert_eq!(measurement.as_tuple(), (125, 79, 68));
    assert_eq!(measurement.extra("date"), Some(&json!("2013-01-02")));
    assert_eq!(measurement.extra("time"), Some(&json!("13:12")));

    let keys: Vec<&str> = measurement.extras().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["date", "time"]);
}

#[test]
fn test_empty_lines_are_skipped() {
    let dataset = parse(
        ParserKind::Regex,
        ParseOptions::default(),
        &["", "2013-01-02 13:12 125/79/68", "   ", "2013-01-03 7:05 131 / 84 / 70"],
    )
    .unwrap();
    assert_eq!(
        slots(&dataset),
        vec![Some((125, 79, 68)), Some((131, 84, 70))]
    );
}

#[test]
fn test_no_match_raises_unless_silent() {
    for mode in [ErrorMode::Strict, ErrorMode::Lenient] {
        let options = ParseOptions::default().with_error_mode(mode);
        let result = parse(ParserKind::Regex, options, &["yesterday: fine"]);
        match result {
            Err(Error::NoMatch { line }) => assert_eq!(line, "yesterday: fine"),
            other => panic!("Expected NoMatch error, got {other:?}"),
        }
    }

    let silent = ParseOptions::default().with_error_mode(ErrorMode::Silent);
    let dataset = parse(
        ParserKind::Regex,
        silent,
        &["yesterday: fine", "2013-01-02 13:12 125/79/68"],
    )
    .unwrap();
    assert_eq!(slots(&dataset), vec![None, Some((125, 79, 68))]);
}

#[test]
fn test_missing_group_is_a_shape_error() {
    let options = ParseOptions::default().with_pattern(r"(?P<sys>\d+)/(?P<dia>\d+)");
    let result = parse(ParserKind::Regex, options.clone(), &["120/80"]);
    match result {
        Err(Error::TokenShape { expected, found, .. }) => {
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("Expected TokenShape error, got {other:?}"),
    }

    let silent = options.with_error_mode(ErrorMode::Silent);
    let dataset = parse(ParserKind::Regex, silent, &["120/80"]).unwrap();
    assert_eq!(slots(&dataset), vec![None]);
}

#[test]
fn test_optional_groups_become_null_extras() {
    let pattern = r"(?P<sys>\d+)/(?P<dia>\d+)/(?P<pulse>\d+)(\s+(?P<note>\w+))?";
    let options = ParseOptions::default().with_pattern(pattern);
    let dataset = parse(ParserKind::Regex, options, &["120/80/70 walking", "121/81/71"]).unwrap();

    let notes: Vec<Value> = dataset
        .iter()
        .flatten()
        .map(|m| m.extra("note").cloned().unwrap())
        .collect();
    assert_eq!(notes, vec![json!("walking"), Value::Null]);
}

#[test]
fn test_non_integer_group_is_a_conversion_error() {
    let options = ParseOptions::default().with_pattern(r"(?P<sys>\w+)/(?P<dia>\d+)/(?P<pulse>\d+)");
    let result = parse(ParserKind::Regex, options, &["high/80/70"]);
    assert!(matches!(result, Err(Error::ValueConversion { .. })));
}

#[test]
fn test_invalid_pattern_is_a_configuration_error() {
    let options = ParseOptions::default().with_pattern(r"(?P<sys>\d+");
    let result = ParserKind::Regex.build(&options);
    assert!(matches!(result, Err(Error::Configuration { .. })));
}
