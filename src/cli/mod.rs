use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mzroi::ingest::MergeMode;
use mzroi::writer::OutputFormat;

mod config;
mod info;
mod process;

use process::ProcessArgs;

/// mzroi - resampled region-of-interest tables from mzML runs
#[derive(Parser)]
#[command(name = "mzroi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// How spectra sharing a retention time are combined.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MergeModeArg {
    /// Concatenate m/z values and sum intensities position by position
    Positional,
    /// Sum intensities of identical m/z values
    ByMz,
}

impl From<MergeModeArg> for MergeMode {
    fn from(arg: MergeModeArg) -> Self {
        match arg {
            MergeModeArg::Positional => MergeMode::Positional,
            MergeModeArg::ByMz => MergeMode::ByMz,
        }
    }
}

/// Output file format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Apache Parquet
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Tsv => OutputFormat::Tsv,
            FormatArg::Parquet => OutputFormat::Parquet,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Bin, resample and export a region of an mzML file
    Process {
        /// Input mzML file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output table path (.csv, .tsv, .txt or .parquet)
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Minimum rows per integer minute
        #[arg(short = 'n', long)]
        points_per_minute: Option<i64>,

        /// First minute to resample (inclusive)
        #[arg(short = 's', long, allow_negative_numbers = true)]
        minute_start: Option<i64>,

        /// Last minute to resample (exclusive)
        #[arg(short = 'e', long, allow_negative_numbers = true)]
        minute_end: Option<i64>,

        /// Lowest exported m/z bin (default: 0)
        #[arg(long)]
        mz_min: Option<f64>,

        /// Highest exported m/z bin (default: unbounded)
        #[arg(long)]
        mz_max: Option<f64>,

        /// Earliest exported retention time in minutes (default: --minute-start)
        #[arg(long, allow_negative_numbers = true)]
        rt_start: Option<f64>,

        /// Latest exported retention time in minutes (default: --minute-end)
        #[arg(long, allow_negative_numbers = true)]
        rt_end: Option<f64>,

        /// Intensities below this value are zeroed (default: 1000)
        #[arg(long)]
        noise_floor: Option<f64>,

        /// How spectra sharing a retention time are combined
        #[arg(long, value_enum)]
        merge: Option<MergeModeArg>,

        /// Only use spectra of this MS level
        #[arg(long)]
        ms_level: Option<u8>,

        /// Output format (inferred from the extension when omitted)
        #[arg(short = 'f', long, value_enum)]
        format: Option<FormatArg>,

        /// ZSTD compression level for Parquet output
        #[arg(short = 'c', long, hide = true)]
        compression_level: Option<i32>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display information about an mzML file
    Info {
        /// Input mzML file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process {
            input,
            output,
            config,
            points_per_minute,
            minute_start,
            minute_end,
            mz_min,
            mz_max,
            rt_start,
            rt_end,
            noise_floor,
            merge,
            ms_level,
            format,
            compression_level,
            json,
        } => process::run(ProcessArgs {
            input,
            output,
            config,
            points_per_minute,
            minute_start,
            minute_end,
            mz_min,
            mz_max,
            rt_start,
            rt_end,
            noise_floor,
            merge_mode: merge.map(MergeMode::from),
            ms_level,
            format: format.map(OutputFormat::from),
            compression_level,
            json,
        }),
        Commands::Info { file, json } => info::run(file, json),
    }
}
