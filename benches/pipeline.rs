use std::io::{BufReader, Cursor};
use std::sync::Arc;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use mzroi::ingest::{IngestConfig, SpectrumIngestor, TimeIndexedSpectra};
use mzroi::matrix::MatrixBuilder;
use mzroi::mzml::MzMLStreamer;
use mzroi::region::{ExportRegion, RegionBounds};
use mzroi::resample::Resampler;

/// Spectra every 3 seconds over `minutes` minutes
fn generate_test_mzml(minutes: usize, peaks_per_spectrum: usize) -> Vec<u8> {
    let num_spectra = minutes * 20;
    let mut mzml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <run id="bench_run">
    <spectrumList count=""#,
    );
    mzml.push_str(&num_spectra.to_string());
    mzml.push_str(r#"">"#);

    for i in 0..num_spectra {
        let rt = (i as f64) * 3.0;

        let mz_values: Vec<f64> = (0..peaks_per_spectrum)
            .map(|j| 100.0 + (j as f64) * 1.7 + (i % 7) as f64 * 0.13)
            .collect();
        let intensity_values: Vec<f32> = (0..peaks_per_spectrum)
            .map(|j| 500.0 + ((i * 31 + j * 17) % 97) as f32 * 40.0)
            .collect();

        let mz_bytes: Vec<u8> = mz_values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let intensity_bytes: Vec<u8> = intensity_values
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();

        let mz_base64 =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &mz_bytes);
        let intensity_base64 =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &intensity_bytes);

        mzml.push_str(&format!(
            r#"
      <spectrum index="{}" id="scan={}" defaultArrayLength="{}">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{}" unitCvRef="UO" unitAccession="UO:0000010" unitName="second"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="2">
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>{}</binary>
          </binaryDataArray>
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>{}</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>"#,
            i,
            i + 1,
            peaks_per_spectrum,
            rt,
            mz_base64,
            intensity_base64
        ));
    }

    mzml.push_str(
        r#"
    </spectrumList>
  </run>
</mzML>"#,
    );

    mzml.into_bytes()
}

fn ingest_bytes(bytes: &[u8]) -> TimeIndexedSpectra {
    let reader = BufReader::new(Cursor::new(bytes.to_vec()));
    let streamer = MzMLStreamer::new(reader).unwrap();
    let (spectra, _) = SpectrumIngestor::new(IngestConfig::default())
        .ingest(streamer.spectra())
        .unwrap();
    spectra
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for minutes in [5, 25, 50] {
        let peaks_per_spectrum = 200;
        let mzml_bytes = Arc::new(generate_test_mzml(minutes, peaks_per_spectrum));

        group.throughput(Throughput::Elements((minutes * 20 * peaks_per_spectrum) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(minutes), &mzml_bytes, |b, bytes| {
            b.iter(|| black_box(ingest_bytes(bytes).len()));
        });
    }

    group.finish();
}

fn bench_build_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_matrix");

    for minutes in [5, 25, 50] {
        let spectra = ingest_bytes(&generate_test_mzml(minutes, 200));

        group.throughput(Throughput::Elements(spectra.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(minutes), &spectra, |b, spectra| {
            b.iter(|| black_box(MatrixBuilder::new().build(spectra).n_cols()));
        });
    }

    group.finish();
}

fn bench_resample_and_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample_and_extract");
    let minutes = 25;
    let table = MatrixBuilder::new().build(&ingest_bytes(&generate_test_mzml(minutes, 200)));

    for target in [20, 60, 120] {
        let resampler = Resampler::new(target, 0, minutes as i64).unwrap();
        let bounds = RegionBounds::new(150.0, 300.0, 2.0, 20.0).unwrap();

        group.throughput(Throughput::Elements(target as u64 * minutes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(target), &table, |b, table| {
            b.iter_batched(
                || table.clone(),
                |table| {
                    let (resampled, _) = resampler.resample(table);
                    black_box(ExportRegion::extract(&resampled, bounds).n_rows())
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ingest,
    bench_build_matrix,
    bench_resample_and_extract
);
criterion_main!(benches);
