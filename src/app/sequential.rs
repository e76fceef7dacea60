//! Single-loop scheduling: read a batch, resolve it, emit, repeat.

use crate::app::{wait_for, StopReason};
use crate::emit::{EmissionScheduler, OutputSink};
use crate::error::Result;
use crate::input::InputSource;
use crate::store::SharedStateStore;
use std::future::Future;
use std::time::Instant;

pub async fn run<I, S, F>(
    source: &mut I,
    store: &SharedStateStore,
    scheduler: &mut EmissionScheduler<S>,
    shutdown: F,
) -> Result<StopReason>
where
    I: InputSource + ?Sized,
    S: OutputSink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let deadline = scheduler.next_deadline();
        tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(StopReason::Shutdown),
            _ = wait_for(deadline) => {
                scheduler.emit(&store.snapshot(), Instant::now())?;
            }
            batch = source.next_batch() => match batch? {
                Some(events) => {
                    let snapshot = store.apply_batch(&events);
                    scheduler.emit(&snapshot, Instant::now())?;
                }
                None => return Ok(StopReason::InputClosed),
            },
        }
    }
}
