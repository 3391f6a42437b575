//! Fetch and evaluation loops.
//!
//! ```text
//! fetch loop (refresh period) ──publish──▶ SnapshotExchange ◀──latest── evaluation loop (evaluate period)
//!                                                  ▲                          │
//!                                                  └──── StatusQuery ─────────┴─▶ SelectedItem
//! ```
//!
//! Both loops run for the life of the process. A failed cycle is logged and
//! the loop carries on; a failed fetch leaves the previous snapshot in place.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::engine::Evaluator;
use crate::clock::{missed_ticks, ticker, Cadence, Clock};
use crate::exchange::SnapshotExchange;
use crate::feed::FeedSource;

/// Fetch once and publish on success. Returns whether a snapshot was published.
pub async fn fetch_once(source: &dyn FeedSource, exchange: &SnapshotExchange) -> bool {
    match source.fetch().await {
        Ok(snapshot) => {
            info!(items = snapshot.len(), "feed snapshot published");
            exchange.publish(Arc::new(snapshot));
            true
        }
        Err(e) => {
            error!("feed refresh failed, keeping previous snapshot: {e}");
            false
        }
    }
}

/// Refresh the snapshot every `period`.
///
/// The first tick is consumed up front: the eager startup fetch already
/// covers it.
pub async fn run_fetch_loop(
    source: Arc<dyn FeedSource>,
    exchange: SnapshotExchange,
    period: Duration,
) {
    let mut ticks = ticker(period);
    ticks.tick().await;
    loop {
        ticks.tick().await;
        debug!("refresh tick");
        fetch_once(source.as_ref(), &exchange).await;
    }
}

/// Evaluate the latest snapshot every `period`, one cycle at a time.
///
/// Waits for the first published snapshot before the first cycle.
pub async fn run_evaluation_loop(
    mut evaluator: Evaluator,
    exchange: SnapshotExchange,
    clock: Arc<dyn Clock>,
    period: Duration,
) {
    let mut snapshot = exchange.wait_for_first().await;
    let mut ticks = ticker(period);
    loop {
        let deadline = ticks.tick().await;
        let missed = missed_ticks(deadline, tokio::time::Instant::now(), period);
        if missed > 0 {
            debug!(missed, "evaluation overran its period, skipped ticks");
        }
        if let Some(latest) = exchange.latest() {
            snapshot = latest;
        }
        evaluator.evaluate(&snapshot, clock.now()).await;
    }
}

/// Handles to the two running loops.
pub struct WatcherHandle {
    pub fetch: JoinHandle<()>,
    pub evaluation: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn abort(&self) {
        self.fetch.abort();
        self.evaluation.abort();
    }
}

/// Wires a feed source, an evaluator and the shared slots into running loops.
pub struct Watcher {
    source: Arc<dyn FeedSource>,
    clock: Arc<dyn Clock>,
    cadence: Cadence,
    exchange: SnapshotExchange,
}

impl Watcher {
    pub fn new(
        source: Arc<dyn FeedSource>,
        clock: Arc<dyn Clock>,
        cadence: Cadence,
        exchange: SnapshotExchange,
    ) -> Self {
        Self {
            source,
            clock,
            cadence,
            exchange,
        }
    }

    pub fn exchange(&self) -> &SnapshotExchange {
        &self.exchange
    }

    /// Fetch eagerly, then spawn both loops.
    pub async fn start(self, evaluator: Evaluator) -> WatcherHandle {
        if !fetch_once(self.source.as_ref(), &self.exchange).await {
            info!("initial fetch failed; evaluation waits for the first snapshot");
        }

        let fetch = tokio::spawn(run_fetch_loop(
            Arc::clone(&self.source),
            self.exchange.clone(),
            self.cadence.refresh,
        ));
        let evaluation = tokio::spawn(run_evaluation_loop(
            evaluator,
            self.exchange.clone(),
            Arc::clone(&self.clock),
            self.cadence.evaluate,
        ));

        WatcherHandle { fetch, evaluation }
    }
}
