//! Application orchestration layer
//!
//! Wires an input source, the shared state store, and the emission scheduler
//! together, runs them under the chosen scheduling model, and guarantees a
//! final all-released batch on the way out.

pub mod messages;
pub mod monitor;
pub mod runtime;
pub mod sequential;

use crate::config::{Config, SchedulingModel};
use crate::emit::{EmissionScheduler, OutputSink, PacingPolicy};
use crate::error::{Result, SocdError};
use crate::input::InputSource;
use crate::keymap::AxisKeyMap;
use crate::store::SharedStateStore;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Why a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Shutdown was requested.
    Shutdown,
    /// The input source closed.
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: StopReason,
    /// Includes the final all-released batch.
    pub batches_emitted: u64,
    pub transitions_applied: u64,
}

/// Application orchestrator
pub struct Application<I, S> {
    source: I,
    sink: S,
    store: Arc<SharedStateStore>,
    mode: SchedulingModel,
    pacing: PacingPolicy,
    monitor_interval: Option<Duration>,
}

impl<I, S> Application<I, S>
where
    I: InputSource + 'static,
    S: OutputSink + 'static,
{
    pub fn new(source: I, sink: S, keymap: AxisKeyMap) -> Self {
        Self {
            source,
            sink,
            store: Arc::new(SharedStateStore::new(keymap)),
            mode: SchedulingModel::default(),
            pacing: PacingPolicy::default(),
            monitor_interval: None,
        }
    }

    pub fn from_config(config: &Config, source: I, sink: S) -> Self {
        Self::new(source, sink, config.keymap)
            .with_mode(config.mode)
            .with_pacing(config.pacing)
            .with_monitor(config.monitor_interval)
    }

    pub fn with_mode(mut self, mode: SchedulingModel) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_monitor(mut self, interval: Option<Duration>) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Handle to the state store, e.g. for inspection.
    pub fn store(&self) -> Arc<SharedStateStore> {
        Arc::clone(&self.store)
    }

    /// Run until `shutdown` resolves, the input closes, or a fatal error occurs.
    ///
    /// In every case a final all-released batch is attempted before the sink is
    /// dropped.
    pub async fn run_until<F>(self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()> + Send,
    {
        let Application {
            mut source,
            sink,
            store,
            mode,
            pacing,
            monitor_interval,
        } = self;

        log::info!(
            "resolving {} from {} ({:?} mode, pacing {:?})",
            store.keymap(),
            source.name(),
            mode,
            pacing
        );

        let (monitor_stop, monitor_rx) = watch::channel(false);
        let monitor = monitor_interval
            .map(|interval| tokio::spawn(monitor::monitor_loop(Arc::clone(&store), interval, monitor_rx)));

        let scheduler = EmissionScheduler::new(*store.keymap(), sink, pacing);
        let (scheduler, outcome) = match mode {
            SchedulingModel::Sequential => {
                let mut scheduler = scheduler;
                let outcome =
                    sequential::run(&mut source, &store, &mut scheduler, shutdown).await;
                (Some(scheduler), outcome)
            }
            SchedulingModel::Concurrent => {
                runtime::run(source, Arc::clone(&store), scheduler, shutdown).await
            }
        };

        let _ = monitor_stop.send(true);
        if let Some(handle) = monitor {
            let _ = handle.await;
        }

        let (release, batches_emitted) = match scheduler {
            Some(mut scheduler) => {
                let release = scheduler.release_all();
                (release, scheduler.batches_emitted())
            }
            None => (Err(SocdError::pipeline("emission task was lost")), 0),
        };

        match (outcome, release) {
            (Ok(reason), Ok(())) => {
                log::info!("stopped ({reason:?}), all keys released");
                Ok(RunSummary {
                    reason,
                    batches_emitted,
                    transitions_applied: store.update_count(),
                })
            }
            (Ok(_), Err(release_err)) => Err(release_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => {
                log::warn!("final release failed: {release_err}");
                Err(err)
            }
        }
    }
}

/// Sleep until `deadline`, or forever when there is none.
pub(crate) async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await
        }
        None => std::future::pending().await,
    }
}
