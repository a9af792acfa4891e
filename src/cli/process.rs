use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::path::PathBuf;

use mzroi::ingest::{IngestConfig, MergeMode, DEFAULT_NOISE_FLOOR};
use mzroi::pipeline::{Pipeline, PipelineEvent, PipelineParams, PipelineReport};
use mzroi::writer::{CompressionType, OutputFormat, WriterConfig};

use super::config::Config;

/// Options of the `process` subcommand as given on the command line
#[derive(Debug, Default)]
pub struct ProcessArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub points_per_minute: Option<i64>,
    pub minute_start: Option<i64>,
    pub minute_end: Option<i64>,
    pub mz_min: Option<f64>,
    pub mz_max: Option<f64>,
    pub rt_start: Option<f64>,
    pub rt_end: Option<f64>,
    pub noise_floor: Option<f64>,
    pub merge_mode: Option<MergeMode>,
    pub ms_level: Option<u8>,
    pub format: Option<OutputFormat>,
    pub compression_level: Option<i32>,
    pub json: bool,
}

/// Merge command-line flags over the config file into pipeline parameters
pub fn resolve_params(args: &ProcessArgs, config: &Config) -> Result<PipelineParams> {
    let file = &config.pipeline;

    let Some(target) = args.points_per_minute.or(file.points_per_minute) else {
        bail!("--points-per-minute is required (or pipeline.points_per_minute in the config file)");
    };
    let Some(start) = args.minute_start.or(file.minute_start) else {
        bail!("--minute-start is required (or pipeline.minute_start in the config file)");
    };
    let Some(end) = args.minute_end.or(file.minute_end) else {
        bail!("--minute-end is required (or pipeline.minute_end in the config file)");
    };

    let mut params = PipelineParams::new(&args.input, &args.output, target, start, end);

    let mz_min = args.mz_min.or(file.mz_min).unwrap_or(params.mz_min);
    let mz_max = args.mz_max.or(file.mz_max).unwrap_or(params.mz_max);
    params = params.with_mz_range(mz_min, mz_max);

    let rt_start = args.rt_start.or(file.rt_start);
    let rt_end = args.rt_end.or(file.rt_end);
    if rt_start.is_some() || rt_end.is_some() {
        params = params.with_rt_range(
            rt_start.unwrap_or(start as f64),
            rt_end.unwrap_or(end as f64),
        );
    }

    params = params.with_ingest(IngestConfig {
        noise_floor: args
            .noise_floor
            .or(file.noise_floor)
            .unwrap_or(DEFAULT_NOISE_FLOOR),
        merge_mode: args.merge_mode.or(file.merge_mode).unwrap_or_default(),
        ms_level: args.ms_level.or(file.ms_level),
    });

    let mut writer = WriterConfig {
        format: args.format.or(config.output.format),
        ..WriterConfig::default()
    };
    if let Some(level) = args.compression_level.or(config.output.compression_level) {
        writer.compression = CompressionType::Zstd(level);
    }

    Ok(params.with_writer(writer))
}

/// Run the pipeline on a worker thread, logging lifecycle events as they arrive
pub fn run(args: ProcessArgs) -> Result<()> {
    if !args.input.exists() {
        bail!("Input file does not exist: {}", args.input.display());
    }

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let params = resolve_params(&args, &config)?;

    info!("Processing {}", params.source_path.display());
    info!("  Output: {}", params.output_path.display());
    info!(
        "  Resampling minutes [{}, {}) to {} points per minute",
        params.minute_start, params.minute_end, params.target_points_per_minute
    );

    let pipeline = Pipeline::new(params).context("Invalid processing parameters")?;
    let handle = pipeline.spawn()?;

    for event in handle.events().iter() {
        match &event {
            PipelineEvent::Started => info!("Pipeline started"),
            PipelineEvent::StageStarted(stage) => info!("Stage: {stage}"),
            PipelineEvent::Completed(_) => info!("Pipeline completed"),
            PipelineEvent::Failed(msg) => warn!("Pipeline failed: {msg}"),
        }
        if event.is_terminal() {
            break;
        }
    }

    let report = handle.wait().context("Processing failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &PipelineReport) {
    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        println!("{}", style("Processing complete").bold().green());
        println!("  {}: {}", style("Input").bold(), report.source_path.display());
        println!("  {}: {}", style("Output").bold(), report.output_path.display());
        println!(
            "  {}: {} spectra, {} retention times, {} m/z bins",
            style("Table").bold(),
            report.ingest.spectra_read,
            report.retention_times,
            report.mz_bins
        );
        println!(
            "  {}: {} rows inserted",
            style("Resampled").bold(),
            style(report.resample.rows_inserted()).cyan()
        );
        println!("  {}: {}", style("Written").bold(), report.writer);
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("Processing complete");
        println!("  Input: {}", report.source_path.display());
        println!("  Output: {}", report.output_path.display());
        println!(
            "  Table: {} spectra, {} retention times, {} m/z bins",
            report.ingest.spectra_read, report.retention_times, report.mz_bins
        );
        println!("  Resampled: {} rows inserted", report.resample.rows_inserted());
        println!("  Written: {}", report.writer);
    }
}
