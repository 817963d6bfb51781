//! Test utilities shared by the parser test modules

use crate::config::ParseOptions;
use crate::error::Result;
use crate::models::{Dataset, Slot};
use crate::parser::ParserKind;

mod pattern_tests;

pub type Tuple = (i32, i32, i32);

/// Run the parser of `kind` over `input` lines
pub fn parse(kind: ParserKind, options: ParseOptions, input: &[&str]) -> Result<Dataset> {
    let parser = kind.build(&options)?;
    let mut lines = input.iter().map(|line| line.to_string());
    parser.parse(&mut lines)
}

/// Run the plain parser with default options
pub fn parse_plain(input: &[&str]) -> Result<Dataset> {
    parse(ParserKind::Plain, ParseOptions::default(), input)
}

/// Flattened slots as tuples, placeholders as `None`
pub fn slots(dataset: &Dataset) -> Vec<Option<Tuple>> {
    dataset.iter().map(slot_tuple).collect()
}

/// Only the measurements, as tuples
pub fn tuples(dataset: &Dataset) -> Vec<Tuple> {
    dataset.iter().flatten().map(|m| m.as_tuple()).collect()
}

fn slot_tuple(slot: &Slot) -> Option<Tuple> {
    slot.as_ref().map(|m| m.as_tuple())
}
