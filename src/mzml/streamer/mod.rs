//! Streaming mzML parser using quick-xml
//!
//! Pull-based: the document is never materialized, spectra are decoded one
//! at a time as the caller advances the iterator.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::models::MzMLRunInfo;

pub use error::MzMLError;
pub use iterators::SpectrumIterator;

mod error;
mod helpers;
mod iterators;
mod spectrum;

#[cfg(test)]
mod tests;

use helpers::get_attribute;

/// Default input buffer size for mzML parsing (64KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Streaming parser for mzML files
pub struct MzMLStreamer<R: BufRead> {
    reader: Reader<R>,
    run: MzMLRunInfo,
    in_spectrum_list: bool,
    reached_end: bool,
    current_spectrum_index: i64,
}

impl MzMLStreamer<BufReader<File>> {
    /// Open an mzML file for streaming with the default buffer size
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::with_capacity(DEFAULT_INPUT_BUFFER_SIZE, file);
        Self::new(reader)
    }
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Result<Self, MzMLError> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        Ok(Self {
            reader: xml_reader,
            run: MzMLRunInfo::default(),
            in_spectrum_list: false,
            reached_end: false,
            current_spectrum_index: 0,
        })
    }

    /// Advance to the `<spectrumList>` element, recording run-level attributes
    /// on the way. Calling it again after the list was found is a no-op.
    pub fn read_run_info(&mut self) -> Result<&MzMLRunInfo, MzMLError> {
        if self.in_spectrum_list || self.reached_end {
            return Ok(&self.run);
        }

        let mut saw_root = false;
        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"mzML" => {
                        saw_root = true;
                        self.run.version = get_attribute(e, "version")?;
                    }
                    b"run" => {
                        self.run.run_id = get_attribute(e, "id")?;
                    }
                    b"spectrumList" => {
                        self.in_spectrum_list = true;
                        self.run.spectrum_count =
                            get_attribute(e, "count")?.and_then(|s| s.parse().ok());
                        break;
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"spectrumList" {
                        self.run.spectrum_count = Some(0);
                        self.reached_end = true;
                        break;
                    }
                }
                Ok(Event::Eof) => {
                    self.reached_end = true;
                    if !saw_root {
                        return Err(MzMLError::InvalidStructure(
                            "no <mzML> element found".to_string(),
                        ));
                    }
                    break;
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(&self.run)
    }

    /// Run-level information read so far
    pub fn run_info(&self) -> &MzMLRunInfo {
        &self.run
    }

    /// Iterate over all spectra
    pub fn spectra(self) -> SpectrumIterator<R> {
        SpectrumIterator {
            streamer: self,
            finished: false,
        }
    }
}
