//! Application constants for bpdiag
//!
//! Default parser options, chart settings and exit codes used throughout
//! the crate.

// =============================================================================
// Measurement Fields
// =============================================================================

/// Number of sub-fields a single plain-text token must decompose into
pub const VALUES_PER_TOKEN: usize = 3;

/// Name of the extra that collects surplus delimited values
pub const EXTRA_BUCKET: &str = "extra";

// =============================================================================
// Parser Defaults
// =============================================================================

/// Token that marks an intentionally skipped measurement
pub const DEFAULT_SKIP_MARKER: &str = "-";

/// Splits a token into its sys, dia and pulse values
pub const DEFAULT_SEPARATOR: &str = "/";

/// Splits a line into tokens (and a CSV record into values)
pub const DEFAULT_DELIMITER: &str = ",";

/// Field order for the delimited parser when none is configured
pub const DEFAULT_CSV_FIELDS: &[&str] = &["sys", "dia", "pulse"];

/// Default pattern for the regex parser: `YYYY-MM-DD HH:MM SYS/DIA/PULSE`
pub const DEFAULT_PATTERN: &str = r"(?P<date>\d{4}-\d{2}-\d{2})\s+(?P<time>\d{1,2}:\d{2})\s+(?P<sys>\d+)\s*/\s*(?P<dia>\d+)\s*/\s*(?P<pulse>\d+)";

// =============================================================================
// Chart Defaults
// =============================================================================

pub const DEFAULT_CHART_FILENAME: &str = "bp.svg";
pub const DEFAULT_CHART_WIDTH: u32 = 800;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;

/// Smallest canvas that fits the chart margins, the legend and a plot area
pub const MIN_CHART_DIMENSION: u32 = 300;

// =============================================================================
// Process Exit Codes
// =============================================================================

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;

    /// A rendering backend or library is missing
    pub const ENVIRONMENT: i32 = 1;

    /// The input could not be parsed
    pub const PARSING: i32 = 2;

    /// Parsing succeeded but produced nothing
    pub const NO_DATA: i32 = 3;

    /// Invalid options or unusable output location
    pub const CONFIGURATION: i32 = 4;
}
