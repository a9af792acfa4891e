//! Background execution of a [`Pipeline`].
//!
//! The run happens on a dedicated named thread so an interactive caller
//! stays responsive. Lifecycle events travel over a crossbeam channel and
//! the final result comes back through [`PipelineHandle::wait`].

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};
use log::debug;

use super::events::ChannelObserver;
use super::{Pipeline, PipelineError, PipelineEvent, PipelineReport};

/// Handle to a pipeline running on a background thread
#[derive(Debug)]
pub struct PipelineHandle {
    events: Receiver<PipelineEvent>,
    handle: JoinHandle<Result<PipelineReport, PipelineError>>,
}

impl PipelineHandle {
    /// Lifecycle events emitted by the run, ending with a terminal event
    pub fn events(&self) -> &Receiver<PipelineEvent> {
        &self.events
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the run finishes and return its result
    pub fn wait(self) -> Result<PipelineReport, PipelineError> {
        self.handle
            .join()
            .map_err(|_| PipelineError::Worker("pipeline thread panicked".to_string()))?
    }
}

impl Pipeline {
    /// Run the pipeline on a background thread.
    ///
    /// The pipeline is moved into the worker, so a single instance can never
    /// run twice concurrently.
    pub fn spawn(self) -> Result<PipelineHandle, PipelineError> {
        let (sender, events) = unbounded();
        let handle = thread::Builder::new()
            .name("mzroi-pipeline".to_string())
            .spawn(move || {
                debug!("Pipeline worker started");
                let mut observer = ChannelObserver::new(sender);
                self.run(&mut observer)
            })
            .map_err(|e| PipelineError::Worker(format!("failed to spawn pipeline thread: {e}")))?;

        Ok(PipelineHandle { events, handle })
    }
}
