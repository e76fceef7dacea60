//! Output sink abstraction.

use crate::error::Result;
use crate::event::EmissionBatch;

/// Destination for emission batches.
///
/// Implementations must deliver events in order. Any error is fatal to the
/// pipeline; there is no retry.
pub trait OutputSink: Send {
    fn write_batch(&mut self, batch: &EmissionBatch) -> Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn write_batch(&mut self, batch: &EmissionBatch) -> Result<()> {
        (**self).write_batch(batch)
    }
}

/// Sink that only logs what would have been written (`--dry-run`).
#[derive(Debug, Default)]
pub struct LogSink {
    written: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for LogSink {
    fn write_batch(&mut self, batch: &EmissionBatch) -> Result<()> {
        self.written += 1;
        log::info!("dry-run batch #{}: {}", self.written, batch.states());
        Ok(())
    }
}
