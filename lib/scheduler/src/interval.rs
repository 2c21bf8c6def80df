//! Fixed-period background tasks.
//!
//! [`IntervalTask::spawn`] runs a job on a tokio interval until the returned
//! [`TaskHandle`] is stopped. The first run happens immediately. Ticks missed
//! while a run is still in flight are skipped, not replayed.

use crate::error::SchedulerError;
use async_trait::async_trait;
use rootcause::Report;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Work run once per tick.
#[async_trait]
pub trait IntervalJob: Send + Sync + 'static {
    /// Runs the job once.
    ///
    /// # Errors
    ///
    /// A failed run is logged and the next tick runs the job again.
    async fn run_once(&self) -> Result<(), Report<SchedulerError>>;
}

/// Spawner for interval tasks.
pub struct IntervalTask;

impl IntervalTask {
    /// Spawns `job` on the current tokio runtime.
    ///
    /// Dropping the handle leaves the task running; call [`TaskHandle::stop`].
    #[must_use = "the handle is the only way to stop the task"]
    pub fn spawn<J: IntervalJob>(name: impl Into<String>, period: Duration, job: J) -> TaskHandle {
        let name = name.into();
        let period = period.max(MIN_PERIOD);
        let token = CancellationToken::new();

        let join = tokio::spawn(run_loop(name.clone(), period, job, token.clone()));
        info!(task = %name, period_ms = period.as_millis() as u64, "interval task started");

        TaskHandle {
            name,
            token,
            join: Mutex::new(Some(join)),
        }
    }
}

async fn run_loop<J: IntervalJob>(name: String, period: Duration, job: J, token: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            () = token.cancelled() => break,
            result = job.run_once() => {
                if let Err(report) = result {
                    warn!(task = %name, error = %report, "interval run failed");
                }
            }
        }
    }

    debug!(task = %name, "interval task exited");
}

/// Stop handle for a spawned interval task.
pub struct TaskHandle {
    name: String,
    token: CancellationToken,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl TaskHandle {
    /// The task name given at spawn.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asks the task to stop. A run in progress is abandoned at its next
    /// await point. Calling this more than once has no further effect.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            info!(task = %self.name, "stopping interval task");
            self.token.cancel();
        }
    }

    /// Returns true once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for the task loop to exit. Returns immediately if it was
    /// already joined.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop panicked.
    pub async fn join(&self) -> Result<(), Report<SchedulerError>> {
        let Some(handle) = self.join.lock().await.take() else {
            return Ok(());
        };
        handle.await.map_err(|e| {
            warn!(task = %self.name, error = %e, "interval task did not exit cleanly");
            SchedulerError::TaskAborted {
                task: self.name.clone(),
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counter {
        runs: Arc<AtomicU32>,
        fail: bool,
    }

    #[async_trait]
    impl IntervalJob for Counter {
        async fn run_once(&self) -> Result<(), Report<SchedulerError>> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SchedulerError::RunFailed {
                    task: "counter".to_string(),
                    reason: "boom".to_string(),
                }
                .into());
            }
            Ok(())
        }
    }

    fn counter(fail: bool) -> (Counter, Arc<AtomicU32>) {
        let runs = Arc::new(AtomicU32::new(0));
        (
            Counter {
                runs: Arc::clone(&runs),
                fail,
            },
            runs,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_every_period() {
        let (job, runs) = counter(false);
        let handle = IntervalTask::spawn("counter", Duration::from_secs(10), job);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(24)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        handle.stop();
        handle.join().await.expect("joins cleanly");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_runs_do_not_stop_the_task() {
        let (job, runs) = counter(true);
        let handle = IntervalTask::spawn("failing", Duration::from_secs(5), job);

        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(!handle.is_stopped());

        handle.stop();
        handle.join().await.expect("joins cleanly");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_loop() {
        let (job, runs) = counter(false);
        let handle = IntervalTask::spawn("stoppable", Duration::from_secs(10), job);
        tokio::time::sleep(Duration::from_secs(1)).await;

        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
        handle.join().await.expect("joins cleanly");
        handle.join().await.expect("second join is a no-op");

        let before = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_clamped() {
        let (job, runs) = counter(false);
        let handle = IntervalTask::spawn("fast", Duration::ZERO, job);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(runs.load(Ordering::SeqCst) >= 1);
        handle.stop();
        handle.join().await.expect("joins cleanly");
        assert_eq!(handle.name(), "fast");
    }
}
