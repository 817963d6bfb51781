//! Command implementation for the bpdiag CLI
//!
//! Turns parsed [`Args`] into a configured [`Processor`] and runs it.

use crate::cli::args::Args;
use crate::processor::{Processor, RunSummary};
use crate::{Error, Result};
use tracing::{debug, info};

/// Main command runner
///
/// 1. Set up logging
/// 2. Resolve the parser and input files
/// 3. Run the processor with the options from the command line
pub fn run(args: Args) -> Result<RunSummary> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let (kind, files) = args.parser_and_files()?;
    info!("Reading {} input(s) with the {} parser", files.len(), kind);

    let processor = Processor::new(kind, args.parse_options())
        .with_export_options(args.export_options())
        .with_chart_options(args.chart_options())
        .with_outputs(args.outputs());

    processor.run(&files)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bpdiag={}", log_level)));

    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    installed.map_err(|e| Error::configuration(format!("cannot install logger: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
