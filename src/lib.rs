//! bpdiag Library
//!
//! Parses blood pressure measurements (systolic, diastolic and pulse) from
//! free-form text, computes statistics over them and exports the results.
//!
//! This library provides tools for:
//! - Parsing plain `sys/dia/pulse` tokens, JSON arrays, regex-matched lines
//!   and delimited records, each with configurable error tolerance
//! - Keeping explicit placeholders for skipped or missing measurements
//! - Computing min, max and average per measured value
//! - Exporting measurements and statistics as JSON
//! - Rendering the three series as an SVG line chart
//!
//! ## Usage
//!
//! ```rust
//! use bpdiag::{Field, ParseOptions, ParserKind, Statistic};
//!
//! # fn example() -> bpdiag::Result<()> {
//! let parser = ParserKind::Plain.build(&ParseOptions::default())?;
//! let mut lines = ["136/83/65", "132/82/70", "144/82/86"]
//!     .into_iter()
//!     .map(String::from);
//! let statistic = Statistic::new(parser.parse(&mut lines)?);
//!
//! assert_eq!(statistic.summary(Field::Sys).avg, Some(137));
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod input;
pub mod models;
pub mod parser;
pub mod processor;
pub mod statistic;

// Re-export commonly used types
pub use config::{ChartOptions, ErrorMode, ExportOptions, ParseOptions};
pub use error::{Error, Result};
pub use models::{Dataset, Field, Measurement, Slot};
pub use parser::{DatasetParser, ParserKind};
pub use statistic::{FieldSummary, Statistic, StatisticExport};
