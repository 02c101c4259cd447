//! Periodic expiry sweep
//!
//! Learned memberships carry an expiry; this task removes the expired ones
//! and then drops realms and learned communities nothing refers to any more.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};
use types::Timestamp;

use crate::state::RouterState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub expired: usize,
    pub pruned_realms: usize,
    pub pruned_comms: usize,
}

/// One sweep at `now`.
pub fn sweep_once(state: &RouterState, now: Timestamp) -> SweepStats {
    let mut table = state.table();
    // the detached memberships drop here, releasing their realm holds
    let expired = table.sweep_expired(now).len();
    let stats = SweepStats {
        expired,
        pruned_realms: table.prune_unreferenced_realms(),
        pruned_comms: table.prune_unreferenced_comms(),
    };

    if stats.expired > 0 {
        info!(
            "Expired {} memberships, pruned {} realms and {} communities",
            stats.expired, stats.pruned_realms, stats.pruned_comms
        );
    } else {
        debug!("Sweep found nothing expired");
    }
    stats
}

/// Sweep every `period` until `shutdown` flips to true or its sender is dropped.
pub fn spawn_sweeper(
    state: Arc<RouterState>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Expiry sweeper running every {:?}", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sweep_once(&state, Timestamp::now());
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Expiry sweeper stopped");
    })
}
