use std::fmt;

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use super::PipelineReport;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading and merging spectra
    Ingest,
    /// Binning into the dense table
    BuildMatrix,
    /// Padding sparse minutes
    Resample,
    /// Cutting out the export region
    ExtractRegion,
    /// Writing the output file
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ingest => "ingest",
            Self::BuildMatrix => "build matrix",
            Self::Resample => "resample",
            Self::ExtractRegion => "extract region",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Lifecycle notifications emitted during a run.
///
/// A run emits `Started`, then `StageStarted` per stage reached, then
/// exactly one of `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The run began
    Started,
    /// A stage began
    StageStarted(Stage),
    /// The output was written
    Completed(PipelineReport),
    /// The run aborted; carries the error message
    Failed(String),
}

impl PipelineEvent {
    /// Whether this is the final event of a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}

/// Receives lifecycle events synchronously on the pipeline's thread
pub trait PipelineObserver {
    /// Called once per event
    fn on_event(&mut self, event: &PipelineEvent);
}

impl<F: FnMut(&PipelineEvent)> PipelineObserver for F {
    fn on_event(&mut self, event: &PipelineEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_event(&mut self, _event: &PipelineEvent) {}
}

/// Forwards events over a channel; a dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: Sender<PipelineEvent>,
}

impl ChannelObserver {
    /// Wrap the sending half of a channel
    pub fn new(sender: Sender<PipelineEvent>) -> Self {
        Self { sender }
    }
}

impl PipelineObserver for ChannelObserver {
    fn on_event(&mut self, event: &PipelineEvent) {
        let _ = self.sender.send(event.clone());
    }
}
