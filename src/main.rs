//! # mzroi
//!
//! Command-line front end for the region-of-interest pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Resample minutes 0-30 to 20 points each and export m/z 100-500
//! mzroi process run.mzML eroi.csv -n 20 -s 0 -e 30 --mz-min 100 --mz-max 500
//!
//! # Same, with settings from a config file
//! mzroi process run.mzML eroi.parquet --config mzroi.toml
//!
//! # Inspect an mzML file
//! mzroi info run.mzML
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
