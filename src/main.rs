use anyhow::Context;
use bpdiag::cli::{args::Args, commands};
use bpdiag::constants::exit_codes;
use bpdiag::processor::RunSummary;
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(_summary) => process::exit(exit_codes::SUCCESS),
        Err(error) => {
            let cause = error.downcast_ref::<bpdiag::Error>();

            // Parse errors were already reported with their file and line
            if !cause.is_some_and(bpdiag::Error::is_parse_error) {
                eprintln!("Error: {:#}", error);
            }
            process::exit(cause.map_or(exit_codes::ENVIRONMENT, bpdiag::Error::exit_code));
        }
    }
}

fn run(args: Args) -> anyhow::Result<RunSummary> {
    let files = args.inputs.len();
    commands::run(args).with_context(|| format!("bpdiag failed on {} argument(s)", files))
}
