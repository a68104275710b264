use crate::fetch::FetchMode;
use crate::Orchestrator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Drives an [`Orchestrator`] on a fixed interval.
///
/// The poller is owned by whoever started it: dropping or stopping it
/// aborts the background task, so no loop outlives its owner. Passes run
/// back to back, never concurrently; a slow pass delays the next tick
/// instead of stacking up.
pub struct Poller {
    handle: JoinHandle<()>,
    passes: watch::Receiver<u64>,
}

impl Poller {
    pub fn start(orchestrator: Arc<Orchestrator>, interval: Duration, mode: FetchMode) -> Self {
        let (tx, passes) = watch::channel(0u64);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut completed = 0u64;
            loop {
                ticker.tick().await;
                match orchestrator.run_pass(mode).await {
                    Ok(outcome) => debug!(?outcome, "polling pass finished"),
                    Err(error) => warn!(%error, "polling pass failed"),
                }
                completed += 1;
                // Receivers may all be gone; the loop keeps polling anyway.
                let _ = tx.send(completed);
            }
        });
        Self { handle, passes }
    }

    /// A receiver that observes the number of completed passes. Useful for
    /// waiting until the leaderboard has been refreshed at least once.
    pub fn passes(&self) -> watch::Receiver<u64> {
        self.passes.clone()
    }

    /// Stops the polling loop. Safe to call more than once.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{driver, orchestrator, session, MockApi};
    use crate::FetchMode;

    #[tokio::test(start_paused = true)]
    async fn the_poller_refreshes_the_leaderboard_on_its_interval() {
        let api = Arc::new(MockApi::new(vec![session(100)], vec![driver(1, "VER")]));
        let orchestrator = orchestrator(api);

        let poller = Poller::start(
            Arc::clone(&orchestrator),
            Duration::from_secs(5),
            FetchMode::Conservative,
        );

        let mut passes = poller.passes();
        passes.changed().await.unwrap();
        assert!(*passes.borrow() >= 1);

        let board = orchestrator.leaderboard().await;
        assert_eq!(board.records.len(), 1);

        passes.changed().await.unwrap();
        assert!(*passes.borrow() >= 2);

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_twice_is_harmless() {
        let api = Arc::new(MockApi::new(vec![session(100)], Vec::new()));
        let orchestrator = orchestrator(api);

        let poller = Poller::start(
            orchestrator,
            Duration::from_secs(5),
            FetchMode::Conservative,
        );
        poller.stop();
        poller.stop();
    }
}
