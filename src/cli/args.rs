//! Command-line argument definitions for bpdiag
//!
//! The interface is a single command: an optional parser name followed by
//! one or more files. Options are grouped by what they affect (error
//! handling, outputs, chart, JSON layout, and the options of each parser).

use crate::config::{ChartOptions, ErrorMode, ExportOptions, ParseOptions};
use crate::constants::{
    DEFAULT_CHART_FILENAME, DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_DELIMITER,
    DEFAULT_SEPARATOR, DEFAULT_SKIP_MARKER,
};
use crate::parser::ParserKind;
use crate::processor::Outputs;
use crate::{Error, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

/// CLI arguments for the blood pressure diagnostics tool
///
/// Reads blood pressure measurements (systolic, diastolic and pulse) from
/// text files, prints min/max/average statistics and exports the data as
/// JSON or as a line chart.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bpdiag",
    version,
    about = "Parse blood pressure measurements and report statistics",
    override_usage = "bpdiag [OPTIONS] [PARSER] <FILENAME>..."
)]
pub struct Args {
    /// Optional parser name (plain, json, regex, csv) followed by the input files
    ///
    /// `-` reads standard input, directories are read recursively and glob
    /// patterns are expanded.
    #[arg(value_name = "FILENAME", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Break on any parsing error and report it
    #[arg(
        short = 'N',
        long = "check",
        conflicts_with_all = ["no_check", "error_mode"],
        help_heading = "Error handling"
    )]
    pub check: bool,

    /// Ignore all parsing errors
    #[arg(
        short = 'n',
        long = "no-check",
        conflicts_with = "error_mode",
        help_heading = "Error handling"
    )]
    pub no_check: bool,

    /// Error handling mode (default: lenient)
    #[arg(long = "error-mode", value_enum, help_heading = "Error handling")]
    pub error_mode: Option<ErrorMode>,

    /// Export data to a chart
    #[arg(short = 'c', long = "chart", help_heading = "Output")]
    pub chart: bool,

    /// Export to JSON as an array of [SYS, DIA, PULSE] arrays
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Export to JSON as an array of objects
    #[arg(short = 'J', long = "json-obj", help_heading = "Output")]
    pub json_obj: bool,

    /// Export statistics to JSON as an object
    #[arg(long = "json-stats", help_heading = "Output")]
    pub json_stats: bool,

    /// Filename of the chart
    #[arg(
        short = 'f',
        long = "filename",
        value_name = "PATH",
        default_value = DEFAULT_CHART_FILENAME,
        help_heading = "Chart options"
    )]
    pub filename: PathBuf,

    /// Render to PNG instead of SVG
    #[arg(long = "png", help_heading = "Chart options")]
    pub png: bool,

    /// Render on a light background
    #[arg(long = "light", help_heading = "Chart options")]
    pub light: bool,

    /// Don't draw dots
    #[arg(long = "no-dots", help_heading = "Chart options")]
    pub no_dots: bool,

    /// Don't draw lines
    #[arg(long = "no-lines", help_heading = "Chart options")]
    pub no_lines: bool,

    /// Fill the area below each line
    #[arg(long = "fill", help_heading = "Chart options")]
    pub fill: bool,

    #[arg(long = "width", value_name = "PIXELS", default_value_t = DEFAULT_CHART_WIDTH, help_heading = "Chart options")]
    pub width: u32,

    #[arg(long = "height", value_name = "PIXELS", default_value_t = DEFAULT_CHART_HEIGHT, help_heading = "Chart options")]
    pub height: u32,

    /// Number of spaces used as indent; 0 = newlines only
    #[arg(long = "indent", value_name = "INT", help_heading = "JSON options")]
    pub indent: Option<usize>,

    /// Skip the spaces after `,` and `:`
    #[arg(long = "compact", help_heading = "JSON options")]
    pub compact: bool,

    /// Sort JSON objects by key
    #[arg(long = "sort", help_heading = "JSON options")]
    pub sort: bool,

    /// Number of measurements per line; 0 = all
    #[arg(
        short = 'e',
        long = "entries",
        value_name = "INT",
        default_value_t = 0,
        help_heading = "[PARSER] plain"
    )]
    pub entries: usize,

    /// Denotes skipped values
    #[arg(
        long = "skip",
        value_name = "STRING",
        default_value = DEFAULT_SKIP_MARKER,
        allow_hyphen_values = true,
        help_heading = "[PARSER] plain"
    )]
    pub skip: String,

    /// Splits multiple measurements on one line (csv: splits the values)
    #[arg(
        long = "delimiter",
        value_name = "STRING",
        default_value = DEFAULT_DELIMITER,
        help_heading = "[PARSER] plain"
    )]
    pub delimiter: String,

    /// Splits a measurement into its sys/dia/pulse values
    #[arg(
        long = "separator",
        value_name = "STRING",
        default_value = DEFAULT_SEPARATOR,
        help_heading = "[PARSER] plain"
    )]
    pub separator: String,

    /// Group the measurements by source line
    #[arg(long = "align", help_heading = "[PARSER] plain")]
    pub align: bool,

    /// Keep empty lines instead of skipping them
    #[arg(long = "keep-empty", help_heading = "[PARSER] plain")]
    pub keep_empty: bool,

    /// Read measurements from objects instead of [SYS, DIA, PULSE] arrays
    #[arg(long = "as-object", help_heading = "[PARSER] json")]
    pub as_object: bool,

    /// Regular expression with sys, dia and pulse named groups
    #[arg(long = "pattern", value_name = "REGEX", help_heading = "[PARSER] regex")]
    pub pattern: Option<String>,

    /// Comma-separated field names in column order
    #[arg(long = "fields", value_name = "LIST", value_delimiter = ',', help_heading = "[PARSER] csv")]
    pub fields: Option<Vec<String>>,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Split the positional arguments into the parser and the input files
    ///
    /// The first argument selects the parser when it names one and more
    /// arguments follow, or when no file of that name exists.
    pub fn parser_and_files(&self) -> Result<(ParserKind, Vec<String>)> {
        let Some((first, rest)) = self.inputs.split_first() else {
            return Err(Error::configuration("no input files given"));
        };

        match first.parse::<ParserKind>() {
            Ok(kind) if !rest.is_empty() => Ok((kind, rest.to_vec())),
            Ok(kind) if !Path::new(first).exists() => Err(Error::configuration(format!(
                "no input files given for the {} parser",
                kind
            ))),
            _ => Ok((ParserKind::default(), self.inputs.clone())),
        }
    }

    pub fn error_mode(&self) -> ErrorMode {
        if self.check {
            ErrorMode::Strict
        } else if self.no_check {
            ErrorMode::Silent
        } else {
            self.error_mode.unwrap_or_default()
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::default()
            .with_error_mode(self.error_mode())
            .with_max_entries(self.entries)
            .with_skip_marker(self.skip.clone())
            .with_separator(self.separator.clone())
            .with_delimiter(self.delimiter.clone());

        if self.align {
            options = options.with_align_by_line();
        }
        if self.keep_empty {
            options = options.with_keep_empty_lines();
        }
        if self.as_object {
            options = options.with_objects();
        }
        if let Some(pattern) = &self.pattern {
            options = options.with_pattern(pattern.clone());
        }
        if let Some(fields) = &self.fields {
            options = options.with_fields(fields.iter().map(|f| f.trim().to_string()));
        }
        options
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            indent: self.indent,
            compact: self.compact,
            sort_keys: self.sort,
        }
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            png: self.png,
            light: self.light,
            dots: !self.no_dots,
            lines: !self.no_lines,
            fill: self.fill,
            ..ChartOptions::default()
                .with_filename(self.filename.clone())
                .with_size(self.width, self.height)
        }
    }

    pub fn outputs(&self) -> Outputs {
        Outputs {
            tuples: self.json,
            objects: self.json_obj,
            stats: self.json_stats,
            chart: self.chart,
        }
    }

    /// Get log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("bpdiag").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_parser_defaults_to_plain() {
        let parsed = args(&["data.txt", "more.txt"]);
        let (kind, files) = parsed.parser_and_files().unwrap();
        assert_eq!(kind, ParserKind::Plain);
        assert_eq!(files, vec!["data.txt", "more.txt"]);
    }

    #[test]
    fn test_parser_name_is_taken_from_first_argument() {
        let parsed = args(&["regex", "data.txt"]);
        let (kind, files) = parsed.parser_and_files().unwrap();
        assert_eq!(kind, ParserKind::Regex);
        assert_eq!(files, vec!["data.txt"]);
    }

    #[test]
    fn test_parser_without_files() {
        let parsed = args(&["json"]);
        assert!(matches!(
            parsed.parser_and_files(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_check_flags() {
        assert_eq!(args(&["f"]).error_mode(), ErrorMode::Lenient);
        assert_eq!(args(&["-N", "f"]).error_mode(), ErrorMode::Strict);
        assert_eq!(args(&["-n", "f"]).error_mode(), ErrorMode::Silent);
        assert_eq!(
            args(&["--error-mode", "strict", "f"]).error_mode(),
            ErrorMode::Strict
        );

        let both = Args::try_parse_from(["bpdiag", "-N", "-n", "f"]);
        assert!(both.is_err());
    }

    #[test]
    fn test_plain_options() {
        let parsed = args(&["-e", "3", "--skip", "n/a", "--delimiter", ";", "--separator", "|", "--align", "f"]);
        let options = parsed.parse_options();
        assert_eq!(options.max_entries, 3);
        assert_eq!(options.skip_marker, "n/a");
        assert_eq!(options.delimiter, ";");
        assert_eq!(options.separator, "|");
        assert!(options.align_by_line);
        assert!(!options.keep_empty_lines);
    }

    #[test]
    fn test_csv_fields_are_split() {
        let parsed = args(&["--fields", "date, sys,dia,pulse", "csv", "f"]);
        assert_eq!(
            parsed.parse_options().fields,
            vec!["date", "sys", "dia", "pulse"]
        );
    }

    #[test]
    fn test_output_and_chart_options() {
        let parsed = args(&["-c", "-J", "--png", "--no-dots", "--fill", "-f", "out.svg", "f"]);
        let outputs = parsed.outputs();
        assert!(outputs.chart && outputs.objects);
        assert!(!outputs.tuples && !outputs.stats);

        let chart = parsed.chart_options();
        assert!(chart.png && chart.fill && chart.lines);
        assert!(!chart.dots);
        assert_eq!(chart.output_path(), PathBuf::from("out.png"));
        assert_eq!((chart.width, chart.height), (800, 600));
    }

    #[test]
    fn test_json_options() {
        let parsed = args(&["--indent", "2", "--compact", "--sort", "f"]);
        assert_eq!(
            parsed.export_options(),
            ExportOptions {
                indent: Some(2),
                compact: true,
                sort_keys: true
            }
        );
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(args(&["f"]).get_log_level(), "warn");
        assert_eq!(args(&["-vv", "f"]).get_log_level(), "debug");
        assert_eq!(args(&["-q", "f"]).get_log_level(), "error");
    }
}
