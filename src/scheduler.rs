use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::feed::FeedEnvelope;
use crate::fetcher::{FeedSource, FetchError};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Scheduled,
    Manual,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub trigger: RefreshTrigger,
    pub result: Result<FeedEnvelope, FetchError>,
}

#[derive(Debug)]
pub enum RefreshEvent {
    Started(RefreshTrigger),
    Finished(FetchOutcome),
}

/// Fetches once on start, then on every interval tick, plus on demand.
///
/// Fetches run one at a time on a single task. Each one is reported as a
/// [`RefreshEvent::Started`] followed by a [`RefreshEvent::Finished`].
/// Dropping the scheduler or calling [`RefreshScheduler::shutdown`] stops it.
pub struct RefreshScheduler {
    manual_tx: mpsc::UnboundedSender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn start<F>(
        source: Arc<F>,
        interval: Duration,
        events: mpsc::UnboundedSender<RefreshEvent>,
    ) -> Self
    where
        F: FeedSource + 'static,
    {
        let (manual_tx, manual_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(source, interval, manual_rx, events));

        Self {
            manual_tx,
            handle: Some(handle),
        }
    }

    /// Request an out-of-band fetch. The interval schedule is unaffected.
    pub fn refresh_now(&self) -> bool {
        self.manual_tx.send(()).is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the task and wait for it; no fetch starts after this returns.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
        info!("Refresh scheduler stopped");
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run<F: FeedSource>(
    source: Arc<F>,
    interval: Duration,
    mut manual_rx: mpsc::UnboundedReceiver<()>,
    events: mpsc::UnboundedSender<RefreshEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut started = false;

    loop {
        let trigger = tokio::select! {
            _ = ticker.tick() => {
                if started {
                    RefreshTrigger::Scheduled
                } else {
                    started = true;
                    RefreshTrigger::Startup
                }
            }
            Some(()) = manual_rx.recv() => RefreshTrigger::Manual,
        };

        debug!("Refreshing feed ({:?})", trigger);
        if events.send(RefreshEvent::Started(trigger)).is_err() {
            break;
        }

        let result = source.fetch().await;
        if let Err(e) = &result {
            error!("Feed refresh ({:?}) failed: {}", trigger, e);
        }

        let outcome = FetchOutcome { trigger, result };
        if events.send(RefreshEvent::Finished(outcome)).is_err() {
            break;
        }
    }

    info!("Event receiver closed, stopping refresh scheduler");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FeedSource for CountingSource {
        async fn fetch(&self) -> Result<FeedEnvelope, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                Err(FetchError::Server { status: 503 })
            } else {
                Ok(FeedEnvelope::default())
            }
        }
    }

    async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<RefreshEvent>) -> FetchOutcome {
        loop {
            match rx.recv().await.expect("scheduler stopped") {
                RefreshEvent::Started(_) => continue,
                RefreshEvent::Finished(outcome) => return outcome,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_precedes_finished() {
        let source = Arc::new(CountingSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = RefreshScheduler::start(source, DEFAULT_REFRESH_INTERVAL, tx);

        assert!(matches!(
            rx.recv().await,
            Some(RefreshEvent::Started(RefreshTrigger::Startup))
        ));
        assert!(matches!(rx.recv().await, Some(RefreshEvent::Finished(_))));

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_on_interval() {
        let source = Arc::new(CountingSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let scheduler = RefreshScheduler::start(source.clone(), DEFAULT_REFRESH_INTERVAL, tx);

        let first = next_outcome(&mut rx).await;
        assert_eq!(first.trigger, RefreshTrigger::Startup);
        assert!(first.result.is_ok());
        assert_eq!(start.elapsed(), Duration::ZERO);

        let second = next_outcome(&mut rx).await;
        assert_eq!(second.trigger, RefreshTrigger::Scheduled);
        assert_eq!(second.result.unwrap_err(), FetchError::Server { status: 503 });
        assert_eq!(start.elapsed(), DEFAULT_REFRESH_INTERVAL);

        let third = next_outcome(&mut rx).await;
        assert_eq!(third.trigger, RefreshTrigger::Scheduled);
        assert_eq!(start.elapsed(), DEFAULT_REFRESH_INTERVAL * 2);

        assert_eq!(source.calls(), 3);
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_does_not_reset_interval() {
        let source = Arc::new(CountingSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let scheduler = RefreshScheduler::start(source.clone(), Duration::from_secs(60), tx);

        assert_eq!(next_outcome(&mut rx).await.trigger, RefreshTrigger::Startup);

        tokio::time::sleep(Duration::from_secs(40)).await;
        assert!(scheduler.refresh_now());
        let manual = next_outcome(&mut rx).await;
        assert_eq!(manual.trigger, RefreshTrigger::Manual);
        assert_eq!(start.elapsed(), Duration::from_secs(40));

        let scheduled = next_outcome(&mut rx).await;
        assert_eq!(scheduled.trigger, RefreshTrigger::Scheduled);
        assert_eq!(start.elapsed(), Duration::from_secs(60));

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_shutdown() {
        let source = Arc::new(CountingSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = RefreshScheduler::start(source.clone(), Duration::from_secs(60), tx);

        next_outcome(&mut rx).await;
        scheduler.shutdown().await;
        let calls = source.calls();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(source.calls(), calls);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_scheduler() {
        let source = Arc::new(CountingSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = RefreshScheduler::start(source.clone(), Duration::from_secs(60), tx);

        next_outcome(&mut rx).await;
        drop(scheduler);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_receiver_stops_scheduler() {
        let source = Arc::new(CountingSource::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = RefreshScheduler::start(source.clone(), Duration::from_secs(60), tx);
        drop(rx);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!scheduler.is_running());
        assert_eq!(source.calls(), 0);
    }
}
