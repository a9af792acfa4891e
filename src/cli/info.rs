use anyhow::{Context, Result};
use std::path::PathBuf;

/// Display a one-pass summary of an mzML file
pub fn run(file: PathBuf, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let summary = mzroi::mzml::summarize(&file)
        .with_context(|| format!("Failed to read mzML file: {}", file.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
        return Ok(());
    }

    println!("mzML File Information");
    println!("=====================");
    println!("File: {}", file.display());
    if let Some(version) = &summary.run.version {
        println!("mzML version: {version}");
    }
    if let Some(run_id) = &summary.run.run_id {
        println!("Run: {run_id}");
    }
    println!();

    println!("Spectra: {}", summary.spectra);
    for (level, count) in &summary.spectra_per_ms_level {
        if *level == 0 {
            println!("  MS level unknown: {count}");
        } else {
            println!("  MS{level}: {count}");
        }
    }
    println!("Total points: {}", summary.total_points);

    match summary.retention_time_range {
        Some((lo, hi)) => println!("Retention time: {lo:.4} - {hi:.4} min"),
        None => println!("Retention time: n/a"),
    }
    match summary.mz_range {
        Some((lo, hi)) => println!("m/z: {lo:.4} - {hi:.4}"),
        None => println!("m/z: n/a"),
    }

    Ok(())
}
