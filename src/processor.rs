//! Processing pipeline from input files to reports and exports.
//!
//! A [`Processor`] runs one pass over its inputs:
//!
//! 1. expand the file arguments into a [`LineSource`]
//! 2. parse the lines with the selected parser
//! 3. compute the [`Statistic`] and print the report to stderr
//! 4. write the selected JSON exports to stdout
//! 5. render the chart
//!
//! A parse error stops the pass and is reported with the file and line
//! that caused it.

use crate::chart::render_chart;
use crate::config::{ChartOptions, ExportOptions, ParseOptions};
use crate::error::{Error, Result};
use crate::export::{objects_json, stats_json, tuples_json};
use crate::input::LineSource;
use crate::models::Field;
use crate::parser::ParserKind;
use crate::statistic::Statistic;
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Which exports a run produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outputs {
    /// JSON array of `[sys, dia, pulse]` arrays
    pub tuples: bool,
    /// JSON array of measurement objects
    pub objects: bool,
    /// JSON statistics object
    pub stats: bool,
    pub chart: bool,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Slots parsed, placeholders included
    pub values: usize,
    /// Placeholders among the values
    pub skipped: usize,
    pub files_read: usize,
    pub files_failed: usize,
    /// Path of the rendered chart, when one was requested
    pub chart: Option<PathBuf>,
}

/// Runs the parse, report and export pipeline
#[derive(Debug, Clone)]
pub struct Processor {
    kind: ParserKind,
    parse_options: ParseOptions,
    export_options: ExportOptions,
    chart_options: ChartOptions,
    outputs: Outputs,
}

impl Processor {
    pub fn new(kind: ParserKind, parse_options: ParseOptions) -> Self {
        Self {
            kind,
            parse_options,
            export_options: ExportOptions::default(),
            chart_options: ChartOptions::default(),
            outputs: Outputs::default(),
        }
    }

    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    pub fn with_chart_options(mut self, options: ChartOptions) -> Self {
        self.chart_options = options;
        self
    }

    pub fn with_outputs(mut self, outputs: Outputs) -> Self {
        self.outputs = outputs;
        self
    }

    /// Process `files`, exporting to stdout and reporting to stderr
    pub fn run<I, S>(&self, files: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.run_with(files, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Process `files`, exporting to `out` and reporting to `report`
    pub fn run_with<I, S>(
        &self,
        files: I,
        out: &mut dyn Write,
        report: &mut dyn Write,
    ) -> Result<RunSummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parser = self.kind.build(&self.parse_options)?;
        if self.outputs.chart {
            self.chart_options.validate()?;
        }

        let mut source = LineSource::new(files);
        let dataset = match parser.parse(&mut source) {
            Ok(dataset) => dataset,
            Err(e) => {
                let position = if self.kind.reads_whole_document() {
                    format!("document from {}", source.read_sources().join(", "))
                } else {
                    source
                        .position()
                        .map_or_else(|| "<no input>".to_string(), ToString::to_string)
                };
                error!("Parsing stopped at {}: {}", position, e);
                writeln!(
                    report,
                    "{} while parsing '{}': {}",
                    "[ERROR]".bright_red().bold(),
                    position,
                    e
                )
                .map_err(|io_error| Error::io("<stderr>", io_error))?;
                return Err(e);
            }
        };

        let statistic = Statistic::new(dataset);
        let summary = RunSummary {
            values: statistic.values().len(),
            skipped: statistic.skipped_count(),
            files_read: source.sources_read(),
            files_failed: source.failed_sources(),
            chart: None,
        };
        info!(
            "Parsed {} value(s) with the {} parser ({} skipped)",
            summary.values, self.kind, summary.skipped
        );

        write_report(report, &statistic, &summary).map_err(|e| Error::io("<stderr>", e))?;
        if statistic.is_empty() {
            return Err(Error::NoData {
                sources: summary.files_read,
            });
        }

        self.write_exports(out, &statistic)?;

        let chart = if self.outputs.chart {
            let path = render_chart(&statistic, &self.chart_options)?;
            writeln!(
                report,
                "{} '{}'",
                "Generated chart:".bright_green(),
                path.display()
            )
            .map_err(|e| Error::io("<stderr>", e))?;
            Some(path)
        } else {
            None
        };

        Ok(RunSummary { chart, ..summary })
    }

    fn write_exports(&self, out: &mut dyn Write, statistic: &Statistic) -> Result<()> {
        let options = &self.export_options;
        let mut documents = Vec::new();
        if self.outputs.tuples {
            documents.push(tuples_json(statistic.data(), options)?);
        }
        if self.outputs.objects {
            documents.push(objects_json(statistic.data(), options)?);
        }
        if self.outputs.stats {
            documents.push(stats_json(statistic, options)?);
        }

        debug!("Writing {} JSON document(s)", documents.len());
        for document in documents {
            writeln!(out, "{}\n", document).map_err(|e| Error::io("<stdout>", e))?;
        }
        out.flush().map_err(|e| Error::io("<stdout>", e))
    }
}

fn write_report(report: &mut dyn Write, statistic: &Statistic, summary: &RunSummary) -> io::Result<()> {
    writeln!(
        report,
        "Read {} value(s) ({} skipped) from {} file(s)...",
        summary.values, summary.skipped, summary.files_read
    )?;
    if summary.files_failed > 0 {
        writeln!(
            report,
            "{} {} file(s) could not be read",
            "WARN:".yellow().bold(),
            summary.files_failed
        )?;
    }
    if statistic.is_empty() {
        return Ok(());
    }

    writeln!(report, "{}", "Statistics (min, max, avg):".bold())?;
    for (field, label) in Field::ALL.into_iter().zip([":: SYS...", ":: DIA...", ":: PULSE."]) {
        let summary = statistic.summary(field);
        writeln!(
            report,
            "{}: {}, {}, {}",
            label,
            cell(summary.min),
            cell(summary.max),
            cell(summary.avg)
        )?;
    }
    Ok(())
}

fn cell(value: Option<i32>) -> String {
    match value {
        Some(value) => format!("{:3}", value),
        None => "  -".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorMode;
    use std::fs;
    use tempfile::TempDir;

    fn run(processor: &Processor, files: &[String]) -> (Result<RunSummary>, String, String) {
        let mut out = Vec::<u8>::new();
        let mut report = Vec::<u8>::new();
        let result = processor.run_with(files, &mut out, &mut report);
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(report).unwrap(),
        )
    }

    fn input(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_report_and_tuples_export() {
        let dir = TempDir::new().unwrap();
        let file = input(&dir, "bp.txt", "136/83/65, 132/82/70\n144/82/86, -\n");
        let processor = Processor::new(ParserKind::Plain, ParseOptions::default().with_max_entries(2))
            .with_outputs(Outputs {
                tuples: true,
                ..Outputs::default()
            });

        let (result, out, report) = run(&processor, &[file]);
        let summary = result.unwrap();

        assert_eq!(summary.values, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.files_read, 1);
        assert_eq!(summary.chart, None);
        assert_eq!(out, "[[136, 83, 65], [132, 82, 70], [144, 82, 86], null]\n\n");
        assert!(report.contains("Read 4 value(s) (1 skipped) from 1 file(s)..."));
        assert!(report.contains(":: SYS...: 132, 144, 137"));
    }

    #[test]
    fn test_parse_error_names_the_position() {
        let dir = TempDir::new().unwrap();
        let file = input(&dir, "bp.txt", "136/83/65\n136/8365\n");
        let processor = Processor::new(ParserKind::Plain, ParseOptions::default());

        let (result, out, report) = run(&processor, &[file.clone()]);
        assert!(matches!(result, Err(Error::TokenShape { .. })));
        assert!(out.is_empty());
        assert!(report.contains(&format!("while parsing '{}:2'", file)));
    }

    #[test]
    fn test_json_error_names_the_documents() {
        let dir = TempDir::new().unwrap();
        let first = input(&dir, "a.json", "[[120, 80, 70],\n");
        let second = input(&dir, "b.json", "[130, 85]]\n");
        let processor = Processor::new(ParserKind::Json, ParseOptions::default());

        let (result, _, report) = run(&processor, &[first.clone(), second.clone()]);
        assert!(matches!(result, Err(Error::MalformedDocument { .. })));
        assert!(report.contains(&format!("while parsing 'document from {}, {}'", first, second)));
        assert!(!report.contains(&format!("{}:1", second)));
    }

    #[test]
    fn test_damaged_bytes_reach_the_parser() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bp.txt");
        fs::write(&path, b"120/80/70\n\xff\xfe note\n130/85/71\n140/90/72\n").unwrap();
        let file = path.display().to_string();

        let lenient = Processor::new(ParserKind::Plain, ParseOptions::default());
        let (result, _, report) = run(&lenient, &[file.clone()]);
        assert!(result.is_err());
        assert!(report.contains(&format!("while parsing '{}:2'", file)));

        let silent = Processor::new(
            ParserKind::Plain,
            ParseOptions::default().with_error_mode(ErrorMode::Silent),
        );
        let (result, _, report) = run(&silent, &[file]);
        let summary = result.unwrap();
        assert_eq!(summary.values, 3);
        assert_eq!(summary.files_failed, 0);
        assert!(report.contains("Read 3 value(s) (0 skipped) from 1 file(s)..."));
    }

    #[test]
    fn test_no_data() {
        let dir = TempDir::new().unwrap();
        let file = input(&dir, "empty.txt", "\n\n");
        let processor = Processor::new(ParserKind::Plain, ParseOptions::default());

        let (result, _, report) = run(&processor, &[file]);
        assert!(matches!(result, Err(Error::NoData { sources: 1 })));
        assert!(report.contains("Read 0 value(s)"));
    }

    #[test]
    fn test_unreadable_file_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let file = input(&dir, "bp.txt", "120/80/70");
        let missing = dir.path().join("missing.txt").display().to_string();
        let processor = Processor::new(ParserKind::Plain, ParseOptions::default());

        let (result, _, report) = run(&processor, &[missing, file]);
        let summary = result.unwrap();
        assert_eq!(summary.files_read, 1);
        assert_eq!(summary.files_failed, 1);
        assert!(report.contains("1 file(s) could not be read"));
    }

    #[test]
    fn test_only_placeholders_report_dashes() {
        let dir = TempDir::new().unwrap();
        let file = input(&dir, "bp.txt", "-, -\n");
        let processor = Processor::new(ParserKind::Plain, ParseOptions::default().with_max_entries(2));

        let (result, _, report) = run(&processor, &[file]);
        assert_eq!(result.unwrap().skipped, 2);
        assert!(report.contains(":: DIA...:   -,   -,   -"));
    }

    #[test]
    fn test_chart_output() {
        let dir = TempDir::new().unwrap();
        let file = input(&dir, "bp.txt", "136/83/65\n132/82/70\n");
        let chart_path = dir.path().join("chart.svg");
        let processor = Processor::new(ParserKind::Plain, ParseOptions::default())
            .with_chart_options(ChartOptions::default().with_filename(&chart_path))
            .with_outputs(Outputs {
                chart: true,
                ..Outputs::default()
            });

        let (result, _, report) = run(&processor, &[file]);
        assert_eq!(result.unwrap().chart, Some(chart_path.clone()));
        assert!(chart_path.exists());
        assert!(report.contains("chart.svg"));
    }
}
