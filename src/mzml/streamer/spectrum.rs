use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};

use super::helpers::{get_attribute, parse_cv_param};
use super::{MzMLError, MzMLStreamer};
use crate::mzml::binary::{BinaryDecoder, BinaryEncoding, CompressionType};
use crate::mzml::cv_params::{accessions, normalize_retention_time, CvParam};
use crate::mzml::models::MzMLSpectrum;

impl<R: BufRead> MzMLStreamer<R> {
    /// Read the next spectrum from the stream
    pub fn next_spectrum(&mut self) -> Result<Option<MzMLSpectrum>, MzMLError> {
        if !self.in_spectrum_list {
            self.read_run_info()?;
            if !self.in_spectrum_list {
                return Ok(None);
            }
        }

        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if e.name().as_ref() == b"spectrum" {
                        let mut spectrum = self.spectrum_header(e)?;
                        self.parse_spectrum_body(&mut spectrum)?;
                        self.current_spectrum_index += 1;
                        return Ok(Some(spectrum));
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"spectrum" {
                        let spectrum = self.spectrum_header(e)?;
                        self.current_spectrum_index += 1;
                        return Ok(Some(spectrum));
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.name().as_ref() == b"spectrumList" {
                        self.in_spectrum_list = false;
                        self.reached_end = true;
                        return Ok(None);
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(
                        "Unexpected EOF in spectrumList".to_string(),
                    ));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    fn spectrum_header(&self, start_event: &BytesStart) -> Result<MzMLSpectrum, MzMLError> {
        let index = get_attribute(start_event, "index")?
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.current_spectrum_index);
        let id = get_attribute(start_event, "id")?.unwrap_or_else(|| format!("index={index}"));
        let default_array_length = get_attribute(start_event, "defaultArrayLength")?
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        Ok(MzMLSpectrum {
            index,
            id,
            default_array_length,
            ..Default::default()
        })
    }

    /// Parse everything between `<spectrum>` and its matching end tag
    fn parse_spectrum_body(&mut self, spectrum: &mut MzMLSpectrum) -> Result<(), MzMLError> {
        let mut depth = 1;
        let mut in_scan_list = false;
        let mut in_precursor_list = false;
        let mut in_binary = false;
        let mut current_binary_array: Option<BinaryArrayContext> = None;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    match e.name().as_ref() {
                        b"scanList" => in_scan_list = true,
                        b"precursorList" => in_precursor_list = true,
                        b"binaryDataArray" => {
                            current_binary_array = Some(BinaryArrayContext::default());
                        }
                        b"binary" => in_binary = true,
                        _ => {}
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"cvParam" {
                        let cv_param = parse_cv_param(e)?;
                        if let Some(ref mut ctx) = current_binary_array {
                            ctx.cv_params.push(cv_param);
                        } else if in_precursor_list {
                            // selected-ion and activation terms are not used
                        } else if in_scan_list {
                            Self::apply_scan_cv_param(spectrum, &cv_param);
                        } else {
                            Self::apply_spectrum_cv_param(spectrum, &cv_param);
                        }
                    }
                }
                Ok(Event::Text(ref t)) => {
                    if in_binary {
                        if let Some(ref mut ctx) = current_binary_array {
                            ctx.base64_data.push_str(&t.unescape()?);
                        }
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    match e.name().as_ref() {
                        b"spectrum" if depth == 0 => break,
                        b"scanList" => in_scan_list = false,
                        b"precursorList" => in_precursor_list = false,
                        b"binary" => in_binary = false,
                        b"binaryDataArray" => {
                            if let Some(ctx) = current_binary_array.take() {
                                Self::decode_binary_array(spectrum, ctx)?;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(format!(
                        "Unexpected EOF in spectrum {}",
                        spectrum.id
                    )));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn apply_spectrum_cv_param(spectrum: &mut MzMLSpectrum, cv: &CvParam) {
        if cv.accession == accessions::MS_LEVEL {
            spectrum.ms_level = cv.parse_value();
        }
    }

    fn apply_scan_cv_param(spectrum: &mut MzMLSpectrum, cv: &CvParam) {
        match cv.accession.as_str() {
            accessions::SCAN_START_TIME => {
                // Multi-scan spectra report one start time per scan; the first wins.
                if spectrum.retention_time.is_none() {
                    spectrum.retention_time = cv
                        .parse_value::<f64>()
                        .map(|val| normalize_retention_time(val, cv.unit_accession.as_deref()));
                }
            }
            _ => Self::apply_spectrum_cv_param(spectrum, cv),
        }
    }

    /// Decode binary array and attach it to the spectrum
    fn decode_binary_array(
        spectrum: &mut MzMLSpectrum,
        ctx: BinaryArrayContext,
    ) -> Result<(), MzMLError> {
        let mut encoding = BinaryEncoding::Float64;
        let mut compression = CompressionType::None;
        let mut is_mz = false;
        let mut is_intensity = false;

        for cv in &ctx.cv_params {
            if let Some(enc) = BinaryEncoding::from_cv_accession(&cv.accession) {
                encoding = enc;
            } else if let Some(comp) = CompressionType::from_cv_accession(&cv.accession) {
                compression = comp;
            } else {
                match cv.accession.as_str() {
                    accessions::MZ_ARRAY => is_mz = true,
                    accessions::INTENSITY_ARRAY => is_intensity = true,
                    _ => {}
                }
            }
        }

        if !is_mz && !is_intensity {
            return Ok(());
        }

        let values = BinaryDecoder::decode(
            &ctx.base64_data,
            encoding,
            compression,
            Some(spectrum.default_array_length),
        )
        .map_err(|source| MzMLError::BinaryError {
            id: spectrum.id.clone(),
            source,
        })?;

        if is_mz {
            spectrum.mz_array = Some(values);
        } else {
            spectrum.intensity_array = Some(values);
        }

        Ok(())
    }
}

/// Context for parsing binary data arrays
#[derive(Debug, Default)]
struct BinaryArrayContext {
    cv_params: Vec<CvParam>,
    base64_data: String,
}
