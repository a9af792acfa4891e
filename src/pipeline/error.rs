use crate::ingest::IngestError;
use crate::mzml::MzMLError;
use crate::region::RegionError;
use crate::resample::ResampleError;
use crate::writer::WriterError;

/// The single error a pipeline run surfaces to its caller
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The acquisition file is unreadable or not valid mzML
    #[error("parse error: {0}")]
    Parse(#[source] MzMLError),

    /// A spectrum is missing required fields or has inconsistent arrays
    #[error("malformed spectrum {id}: {reason}")]
    MalformedSpectrum {
        /// Native ID of the offending spectrum
        id: String,
        /// What is wrong with it
        reason: String,
    },

    /// Sampling target or minute range is unusable
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Export bounds are inverted or not numbers
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// The output could not be written
    #[error("output error: {0}")]
    Io(#[source] WriterError),

    /// The background worker could not be started or panicked
    #[error("pipeline worker failed: {0}")]
    Worker(String),
}

impl From<IngestError> for PipelineError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Parse(source) => Self::Parse(source),
            IngestError::MalformedSpectrum { id, reason } => Self::MalformedSpectrum { id, reason },
        }
    }
}

impl From<ResampleError> for PipelineError {
    fn from(err: ResampleError) -> Self {
        match err {
            ResampleError::InvalidParameter(msg) => Self::InvalidParameter(msg),
        }
    }
}

impl From<RegionError> for PipelineError {
    fn from(err: RegionError) -> Self {
        match err {
            RegionError::InvalidRange(msg) => Self::InvalidRange(msg),
        }
    }
}

impl From<WriterError> for PipelineError {
    fn from(err: WriterError) -> Self {
        Self::Io(err)
    }
}
