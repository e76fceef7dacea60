//! Two-task scheduling: a capture task writes the store, an emission worker reads it.

use crate::app::messages::EmissionCommand;
use crate::app::{wait_for, StopReason};
use crate::emit::{EmissionScheduler, OutputSink};
use crate::error::{Result, SocdError};
use crate::input::InputSource;
use crate::store::SharedStateStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;

const EMIT_QUEUE_DEPTH: usize = 64;

/// Apply incoming batches to the store and notify the emission worker.
pub async fn capture_loop<I>(
    mut source: I,
    store: Arc<SharedStateStore>,
    tx: mpsc::Sender<EmissionCommand>,
    mut stop: watch::Receiver<bool>,
) -> Result<StopReason>
where
    I: InputSource,
{
    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => return Ok(StopReason::Shutdown),
            batch = source.next_batch() => match batch? {
                Some(events) => {
                    let snapshot = store.apply_batch(&events);
                    if tx.send(EmissionCommand::Emit(snapshot)).await.is_err() {
                        return Err(SocdError::pipeline("emission worker stopped"));
                    }
                }
                None => return Ok(StopReason::InputClosed),
            },
        }
    }
}

/// Emit each batch's snapshot in arrival order, and the store's current
/// snapshot whenever a pacing hold expires.
///
/// The scheduler is handed back in all cases so the caller can still release
/// every key.
pub async fn emission_worker_loop<S>(
    mut rx: mpsc::Receiver<EmissionCommand>,
    store: Arc<SharedStateStore>,
    mut scheduler: EmissionScheduler<S>,
) -> (EmissionScheduler<S>, Result<()>)
where
    S: OutputSink,
{
    let result = loop {
        let deadline = scheduler.next_deadline();
        let snapshot = tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(EmissionCommand::Emit(snapshot)) => snapshot,
                Some(EmissionCommand::Shutdown) | None => break Ok(()),
            },
            _ = wait_for(deadline) => store.snapshot(),
        };

        if let Err(err) = scheduler.emit(&snapshot, Instant::now()) {
            break Err(err);
        }
    };
    (scheduler, result)
}

enum FirstToFinish<S> {
    Shutdown,
    Capture(Result<StopReason>),
    Emission(std::result::Result<(EmissionScheduler<S>, Result<()>), JoinError>),
}

fn flatten_capture(joined: std::result::Result<Result<StopReason>, JoinError>) -> Result<StopReason> {
    joined.map_err(|e| SocdError::pipeline(format!("capture task failed: {e}")))?
}

/// Run capture and emission as separate tasks until shutdown, input close, or failure.
pub async fn run<I, S, F>(
    source: I,
    store: Arc<SharedStateStore>,
    scheduler: EmissionScheduler<S>,
    shutdown: F,
) -> (Option<EmissionScheduler<S>>, Result<StopReason>)
where
    I: InputSource + 'static,
    S: OutputSink + 'static,
    F: Future<Output = ()>,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(EMIT_QUEUE_DEPTH);
    let (stop_tx, stop_rx) = watch::channel(false);

    let mut capture = tokio::spawn(capture_loop(
        source,
        Arc::clone(&store),
        cmd_tx.clone(),
        stop_rx,
    ));
    let mut emission = tokio::spawn(emission_worker_loop(cmd_rx, store, scheduler));

    tokio::pin!(shutdown);
    let first = tokio::select! {
        biased;
        _ = &mut shutdown => FirstToFinish::Shutdown,
        joined = &mut capture => FirstToFinish::Capture(flatten_capture(joined)),
        joined = &mut emission => FirstToFinish::Emission(joined),
    };

    match first {
        FirstToFinish::Shutdown => {
            let _ = stop_tx.send(true);
            if let Err(err) = flatten_capture(capture.await) {
                log::warn!("capture stopped with error during shutdown: {err}");
            }
            let _ = cmd_tx.send(EmissionCommand::Shutdown).await;
            finish_emission(emission.await, Ok(StopReason::Shutdown))
        }
        FirstToFinish::Capture(outcome) => {
            let _ = cmd_tx.send(EmissionCommand::Shutdown).await;
            finish_emission(emission.await, outcome)
        }
        FirstToFinish::Emission(joined) => {
            let _ = stop_tx.send(true);
            let _ = capture.await;
            let outcome = Err(SocdError::pipeline("emission worker stopped unexpectedly"));
            finish_emission(joined, outcome)
        }
    }
}

fn finish_emission<S>(
    joined: std::result::Result<(EmissionScheduler<S>, Result<()>), JoinError>,
    outcome: Result<StopReason>,
) -> (Option<EmissionScheduler<S>>, Result<StopReason>) {
    match joined {
        // A sink failure takes precedence over how capture ended.
        Ok((scheduler, Err(err))) => (Some(scheduler), Err(err)),
        Ok((scheduler, Ok(()))) => (Some(scheduler), outcome),
        Err(join_err) => (
            None,
            Err(SocdError::pipeline(format!("emission task failed: {join_err}"))),
        ),
    }
}
