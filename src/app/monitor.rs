//! Periodic debug dump of raw and resolved key state.

use crate::store::SharedStateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

pub async fn monitor_loop(
    store: Arc<SharedStateStore>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = ticker.tick() => {
                let snapshot = store.snapshot();
                log::debug!(
                    "keystates {} virtual keystates {}",
                    snapshot.raw,
                    snapshot.resolved
                );
            }
        }
    }
}
