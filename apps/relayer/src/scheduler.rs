//! Periodic, non-overlapping, gracefully-stoppable driver of the Relayer Job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[async_trait]
pub trait Job: Send + Sync {
    /// `ctx` is cancelled when `Scheduler::stop` is called; implementations
    /// should thread it into any cancellable work they start.
    async fn run(&self, ctx: CancellationToken) -> eyre::Result<()>;
}

struct Inner {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Non-overlap is structural: the driving loop only returns to its `select!`
/// after the current job invocation has finished, so a slow job can never be
/// invoked a second time while the first is still running.
pub struct Scheduler<J> {
    job: Arc<J>,
    interval: Duration,
    inner: Mutex<Option<Inner>>,
}

impl<J: Job + 'static> Scheduler<J> {
    pub fn new(job: J, interval: Duration) -> Self {
        Self {
            job: Arc::new(job),
            interval,
            inner: Mutex::new(None),
        }
    }

    /// Starts the driving loop. Fires one job invocation immediately, then on
    /// every `interval` thereafter. A second `start()` while already running
    /// is a no-op.
    pub async fn start(&self) {
        let mut guard = self.inner.lock().await;
        if guard.is_some() {
            info!("scheduler already started");
            return;
        }

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let job = Arc::clone(&self.job);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            run_job(job.as_ref(), loop_cancel.clone()).await;

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await; // the tick fired at construction; consume it

            loop {
                tokio::select! {
                    biased;
                    () = loop_cancel.cancelled() => {
                        info!("scheduler stopped gracefully");
                        return;
                    }
                    _ = ticker.tick() => {
                        run_job(job.as_ref(), loop_cancel.clone()).await;
                    }
                }
            }
        });

        *guard = Some(Inner { cancel, handle });
    }

    /// Signals the loop to stop, cancelling any in-flight job's context, and
    /// waits for it to finish. Idempotent: calling `stop()` when not running
    /// is a no-op.
    pub async fn stop(&self) {
        let inner = self.inner.lock().await.take();
        if let Some(inner) = inner {
            inner.cancel.cancel();
            let _ = inner.handle.await;
        }
    }

    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}

async fn run_job<J: Job + ?Sized>(job: &J, ctx: CancellationToken) {
    if let Err(e) = job.run(ctx).await {
        error!(error = %e, "relayer job tick failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;
    use tokio::sync::Mutex as TokioMutex;

    struct CountingJob {
        count: AtomicUsize,
        sleep: Duration,
    }

    #[async_trait]
    impl Job for CountingJob {
        async fn run(&self, _ctx: CancellationToken) -> eyre::Result<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.sleep).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_triggers_immediate_invocation() {
        let job = CountingJob {
            count: AtomicUsize::new(0),
            sleep: Duration::from_millis(0),
        };
        let scheduler = Scheduler::new(job, Duration::from_secs(60));
        scheduler.start().await;
        tokio::task::yield_now().await;
        assert!(scheduler.job.count.load(Ordering::SeqCst) >= 1);
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn stop_waits_for_in_flight_job() {
        let job = CountingJob {
            count: AtomicUsize::new(0),
            sleep: Duration::from_millis(50),
        };
        let scheduler = Scheduler::new(job, Duration::from_secs(60));

        let start = Instant::now();
        scheduler.start().await;
        scheduler.stop().await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(50), "elapsed = {elapsed:?}");
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let job = CountingJob {
            count: AtomicUsize::new(0),
            sleep: Duration::from_millis(0),
        };
        let scheduler = Scheduler::new(job, Duration::from_secs(60));
        scheduler.start().await;
        scheduler.stop().await;
        scheduler.stop().await; // must not hang or panic
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn is_running_reflects_lifecycle() {
        let job = CountingJob {
            count: AtomicUsize::new(0),
            sleep: Duration::from_millis(0),
        };
        let scheduler = Scheduler::new(job, Duration::from_secs(60));
        assert!(!scheduler.is_running().await);
        scheduler.start().await;
        assert!(scheduler.is_running().await);
        scheduler.stop().await;
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn does_not_overlap_invocations() {
        let invocations: Arc<TokioMutex<Vec<(Instant, Instant)>>> =
            Arc::new(TokioMutex::new(Vec::new()));

        struct TrackingJob {
            invocations: Arc<TokioMutex<Vec<(Instant, Instant)>>>,
        }

        #[async_trait]
        impl Job for TrackingJob {
            async fn run(&self, _ctx: CancellationToken) -> eyre::Result<()> {
                let start = Instant::now();
                tokio::time::sleep(Duration::from_millis(30)).await;
                self.invocations.lock().await.push((start, Instant::now()));
                Ok(())
            }
        }

        let job = TrackingJob {
            invocations: invocations.clone(),
        };
        let scheduler = Scheduler::new(job, Duration::from_millis(10));
        scheduler.start().await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        scheduler.stop().await;

        let runs = invocations.lock().await;
        for pair in runs.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            assert!(next_start >= prev_end, "overlap detected: {pair:?}");
        }
    }

    #[tokio::test]
    async fn stop_cancels_in_flight_job_context() {
        struct ObservingJob {
            observed_cancel: Arc<TokioMutex<bool>>,
        }

        #[async_trait]
        impl Job for ObservingJob {
            async fn run(&self, ctx: CancellationToken) -> eyre::Result<()> {
                ctx.cancelled().await;
                *self.observed_cancel.lock().await = true;
                Ok(())
            }
        }

        let observed_cancel = Arc::new(TokioMutex::new(false));
        let job = ObservingJob {
            observed_cancel: observed_cancel.clone(),
        };
        let scheduler = Scheduler::new(job, Duration::from_secs(60));
        scheduler.start().await;
        tokio::task::yield_now().await;
        scheduler.stop().await;

        assert!(*observed_cancel.lock().await, "in-flight job must observe Stop's cancellation");
    }
}
