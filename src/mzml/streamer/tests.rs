use super::*;
use base64::prelude::*;
use std::io::{BufReader, Cursor};

const MINIMAL_MZML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <run id="test_run">
    <spectrumList count="1">
      <spectrum index="0" id="scan=1" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
        <cvParam cvRef="MS" accession="MS:1000130" name="positive scan"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="60.0" unitCvRef="UO" unitAccession="UO:0000010" unitName="second"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="2">
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>AAAAAAAAWUAAAAAAAABpQA==</binary>
          </binaryDataArray>
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>AADIQgAASEM=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
    </spectrumList>
  </run>
</mzML>"#;

fn streamer_for(xml: &str) -> MzMLStreamer<BufReader<Cursor<Vec<u8>>>> {
    MzMLStreamer::new(BufReader::new(Cursor::new(xml.as_bytes().to_vec()))).unwrap()
}

fn f64_array(values: &[f64]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    BASE64_STANDARD.encode(bytes)
}

fn spectrum_xml(index: usize, rt_minutes: f64, mz: &[f64], intensity: &[f64]) -> String {
    format!(
        r#"<spectrum index="{index}" id="scan={scan}" defaultArrayLength="{len}">
  <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
  <scanList count="1"><scan>
    <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{rt_minutes}" unitCvRef="UO" unitAccession="UO:0000031" unitName="minute"/>
  </scan></scanList>
  <binaryDataArrayList count="2">
    <binaryDataArray>
      <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
      <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
      <binary>{mz}</binary>
    </binaryDataArray>
    <binaryDataArray>
      <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
      <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
      <binary>{intensity}</binary>
    </binaryDataArray>
  </binaryDataArrayList>
</spectrum>"#,
        scan = index + 1,
        len = mz.len(),
        mz = f64_array(mz),
        intensity = f64_array(intensity),
    )
}

#[test]
fn test_parse_minimal_mzml() {
    let mut streamer = streamer_for(MINIMAL_MZML);

    let spectrum = streamer.next_spectrum().unwrap().unwrap();

    assert_eq!(spectrum.index, 0);
    assert_eq!(spectrum.id, "scan=1");
    assert_eq!(spectrum.ms_level, Some(1));
    // 60 seconds is one minute
    assert!((spectrum.retention_time.unwrap() - 1.0).abs() < 1e-12);
    assert_eq!(spectrum.mz_array, Some(vec![100.0, 200.0]));
    assert_eq!(spectrum.intensity_array, Some(vec![100.0, 200.0]));

    assert!(streamer.next_spectrum().unwrap().is_none());
    assert_eq!(streamer.run_info().run_id.as_deref(), Some("test_run"));
    assert_eq!(streamer.run_info().spectrum_count, Some(1));
}

#[test]
fn test_iterates_multiple_spectra_in_order() {
    let xml = format!(
        r#"<indexedmzML><mzML version="1.1.0"><run id="r"><spectrumList count="2">{}{}</spectrumList></run></mzML></indexedmzML>"#,
        spectrum_xml(0, 1.25, &[100.2, 100.6], &[500.0, 1500.0]),
        spectrum_xml(1, 1.5, &[250.0], &[3000.0]),
    );

    let spectra: Vec<_> = streamer_for(&xml)
        .spectra()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(spectra.len(), 2);
    assert_eq!(spectra[0].retention_time, Some(1.25));
    assert_eq!(spectra[0].mz_array, Some(vec![100.2, 100.6]));
    assert_eq!(spectra[1].retention_time, Some(1.5));
    assert_eq!(spectra[1].intensity_array, Some(vec![3000.0]));
}

#[test]
fn test_missing_intensity_array_is_reported_as_absent() {
    let xml = r#"<mzML><run><spectrumList count="1">
      <spectrum index="0" id="scan=1" defaultArrayLength="0">
        <scanList><scan><cvParam accession="MS:1000016" name="scan start time" value="2.0"/></scan></scanList>
      </spectrum>
    </spectrumList></run></mzML>"#;

    let spectrum = streamer_for(xml).next_spectrum().unwrap().unwrap();
    assert_eq!(spectrum.retention_time, Some(2.0));
    assert!(spectrum.mz_array.is_none());
    assert!(spectrum.intensity_array.is_none());
}

#[test]
fn test_document_without_spectra_yields_nothing() {
    let xml = r#"<mzML version="1.1.0"><run id="empty"><spectrumList count="0"/></run></mzML>"#;
    let mut streamer = streamer_for(xml);
    assert!(streamer.next_spectrum().unwrap().is_none());
    assert_eq!(streamer.run_info().spectrum_count, Some(0));
}

#[test]
fn test_non_mzml_input_is_an_error() {
    let mut streamer = streamer_for("this is not xml at all");
    assert!(streamer.next_spectrum().is_err());
}

#[test]
fn test_truncated_spectrum_is_an_error() {
    let xml = r#"<mzML><run><spectrumList count="1"><spectrum index="0" id="scan=1" defaultArrayLength="0">"#;
    let err = streamer_for(xml).next_spectrum().unwrap_err();
    assert!(matches!(err, MzMLError::InvalidStructure(_) | MzMLError::XmlError(_)));
}

#[test]
fn test_bad_base64_names_the_spectrum() {
    let xml = r#"<mzML><run><spectrumList count="1">
      <spectrum index="0" id="scan=7" defaultArrayLength="1">
        <binaryDataArrayList count="1"><binaryDataArray>
          <cvParam accession="MS:1000514" name="m/z array"/>
          <binary>@@not-base64@@</binary>
        </binaryDataArray></binaryDataArrayList>
      </spectrum>
    </spectrumList></run></mzML>"#;

    match streamer_for(xml).next_spectrum() {
        Err(MzMLError::BinaryError { id, .. }) => assert_eq!(id, "scan=7"),
        other => panic!("expected binary error, got {other:?}"),
    }
}
