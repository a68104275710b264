use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tracing::debug;

struct Pacer {
    admitted_in_batch: usize,
    batch_opened: Instant,
}

/// Admission control for upstream requests.
///
/// The free API tier allows roughly three requests per second, so the
/// scheduler bounds how many requests run at once and pauses between
/// admission batches. One long-lived instance is shared by every caller in
/// the process; there is no ambient global state.
pub struct RequestScheduler {
    permits: Arc<Semaphore>,
    pacer: Mutex<Pacer>,
    batch_size: usize,
    batch_delay: Duration,
}

impl RequestScheduler {
    pub fn new(max_in_flight: usize, batch_delay: Duration) -> Self {
        let batch_size = max_in_flight.max(1);
        Self {
            permits: Arc::new(Semaphore::new(batch_size)),
            pacer: Mutex::new(Pacer {
                admitted_in_batch: 0,
                batch_opened: Instant::now(),
            }),
            batch_size,
            batch_delay,
        }
    }

    /// Runs one request under the scheduler's admission policy: waits for an
    /// in-flight permit, then for the current batch window, then executes.
    pub async fn run<F, T>(&self, request: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is owned by this scheduler and never closed.
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("scheduler semaphore closed");
        self.admit().await;
        request.await
    }

    async fn admit(&self) {
        let mut pacer = self.pacer.lock().await;
        if pacer.admitted_in_batch >= self.batch_size {
            // Holding the lock here is intentional: no further admissions
            // until the inter-batch delay has elapsed.
            let reopen = pacer.batch_opened + self.batch_delay;
            debug!("request batch full, pacing before next admission");
            tokio::time::sleep_until(reopen).await;
            pacer.admitted_in_batch = 0;
        }
        if pacer.admitted_in_batch == 0 {
            pacer.batch_opened = Instant::now();
        }
        pacer.admitted_in_batch += 1;
    }
}
