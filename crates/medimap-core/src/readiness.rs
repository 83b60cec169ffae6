//! Polling gate for the external mapping/geocoding capability.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Side-effect free check of whether the mapping capability has initialized.
pub trait ReadinessProbe: Send + Sync {
    fn is_ready(&self) -> bool;
}

impl<F> ReadinessProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_ready(&self) -> bool {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Ready,
    TimedOut,
    Cancelled,
}

impl GateOutcome {
    pub fn is_ready(self) -> bool {
        self == GateOutcome::Ready
    }
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateOutcome::Ready => write!(f, "ready"),
            GateOutcome::TimedOut => write!(f, "timed out"),
            GateOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Poll `probe` every `interval` until it reports ready.
///
/// The first probe happens immediately. Polling stops when `timeout` elapses
/// or `cancel` fires; dropping the future also stops it.
pub async fn await_ready(
    probe: &dyn ReadinessProbe,
    interval: Duration,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> GateOutcome {
    // tokio::time::interval panics on a zero period
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut attempts: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(attempts, "readiness polling cancelled");
                return GateOutcome::Cancelled;
            }
            _ = ticker.tick() => {
                attempts += 1;
                if probe.is_ready() {
                    info!(attempts, "mapping capability ready");
                    return GateOutcome::Ready;
                }
                debug!(attempts, "mapping capability not ready yet");
            }
            _ = sleep_until(deadline) => {
                info!(attempts, "gave up waiting for mapping capability");
                return GateOutcome::TimedOut;
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ready_immediately() {
        let cancel = CancellationToken::new();
        let outcome = await_ready(&|| true, Duration::from_millis(500), None, &cancel).await;
        assert_eq!(outcome, GateOutcome::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval_until_ready() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let probe = move || counter.fetch_add(1, Ordering::SeqCst) >= 3;
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let outcome = await_ready(&probe, Duration::from_millis(500), None, &cancel).await;

        assert!(outcome.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(start.elapsed() >= Duration::from_millis(1500));
        assert!(start.elapsed() < Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let probe = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        };
        let cancel = CancellationToken::new();

        let outcome = await_ready(
            &probe,
            Duration::from_millis(500),
            Some(Duration::from_millis(1200)),
            &cancel,
        )
        .await;

        assert_eq!(outcome, GateOutcome::TimedOut);
        // Probes at 0, 500 and 1000 ms
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let probe = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        };
        let cancel = CancellationToken::new();
        let child = cancel.clone();

        let handle = tokio::spawn(async move {
            await_ready(&probe, Duration::from_millis(1000), None, &child).await
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        cancel.cancel();
        let outcome = handle.await.unwrap();

        assert_eq!(outcome, GateOutcome::Cancelled);
        let seen = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_becomes_ready_from_another_task() {
        let flag = Arc::new(AtomicBool::new(false));
        let setter = flag.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1800)).await;
            setter.store(true, Ordering::SeqCst);
        });

        let probe = move || flag.load(Ordering::SeqCst);
        let cancel = CancellationToken::new();
        let start = Instant::now();
        let outcome = await_ready(&probe, Duration::from_millis(500), None, &cancel).await;

        assert!(outcome.is_ready());
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert!(start.elapsed() < Duration::from_millis(2500));
    }
}
