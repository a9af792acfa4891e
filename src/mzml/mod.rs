//! # mzML Reader Module
//!
//! Streaming parsing of mzML files, the XML-based community standard for mass
//! spectrometry data defined by HUPO-PSI. Only the parts of the document the
//! binning pipeline consumes are decoded: the scan start time, the MS level and
//! the m/z and intensity arrays of every spectrum.
//!
//! ## mzML Structure
//!
//! ```text
//! indexedmzML (optional wrapper)
//! └── mzML
//!     ├── ... (file description, instruments, processing; skipped)
//!     └── run
//!         └── spectrumList
//!             └── spectrum* (many)
//!                 ├── cvParam* (ms level)
//!                 ├── scanList
//!                 │   └── scan
//!                 │       └── cvParam (scan start time)
//!                 └── binaryDataArrayList
//!                     └── binaryDataArray*
//!                         ├── cvParam* (encoding, compression, array kind)
//!                         └── binary (base64 data)
//! ```

mod binary;
mod cv_params;
mod models;
mod streamer;

use std::path::Path;

pub use binary::{BinaryDecodeError, BinaryDecoder, BinaryEncoding, CompressionType};
pub use cv_params::{accessions, normalize_retention_time, CvParam};
pub use models::{MzMLRunInfo, MzMLSpectrum, MzMLSummary};
pub use streamer::{MzMLError, MzMLStreamer, SpectrumIterator, DEFAULT_INPUT_BUFFER_SIZE};

/// Read an mzML file once and summarize its contents
pub fn summarize<P: AsRef<Path>>(path: P) -> Result<MzMLSummary, MzMLError> {
    let mut streamer = MzMLStreamer::open(path)?;
    let mut summary = MzMLSummary::default();

    while let Some(spectrum) = streamer.next_spectrum()? {
        summary.observe(&spectrum);
    }
    summary.run = streamer.run_info().clone();

    Ok(summary)
}
