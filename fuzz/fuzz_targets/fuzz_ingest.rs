#![no_main]

use libfuzzer_sys::fuzz_target;
use mzroi::ingest::{IngestConfig, MergeMode, SpectrumIngestor};
use mzroi::matrix::MatrixBuilder;
use mzroi::mzml::MzMLStreamer;
use mzroi::region::{ExportRegion, RegionBounds};
use mzroi::resample::Resampler;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Malformed documents must surface as errors, never panics
    let Ok(streamer) = MzMLStreamer::new(Cursor::new(data)) else {
        return;
    };

    let merge_mode = if data.len() % 2 == 0 {
        MergeMode::Positional
    } else {
        MergeMode::ByMz
    };
    let ingestor = SpectrumIngestor::new(IngestConfig {
        merge_mode,
        ..Default::default()
    });
    let Ok((spectra, _)) = ingestor.ingest(streamer.spectra().take(100)) else {
        return;
    };

    let table = MatrixBuilder::new().build(&spectra);
    if let Ok(resampler) = Resampler::new(4, -2, 10) {
        let (table, _) = resampler.resample(table);
        let _ = ExportRegion::extract(&table, RegionBounds::default());
    }
});
