//! Bounded-wait polling.
//!
//! UI assertions are inherently racy against render timing, so every wait
//! in this crate goes through one primitive: poll a condition at a fixed
//! interval until it holds or a deadline elapses. These are the only
//! suspension points in a verification run.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::error::{Error, Result};

/// Default deadline for wait operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default fixed poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout and poll interval for a bounded wait.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Custom timeout, default interval.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// A timeout large enough to overflow `Instant` arithmetic has no
/// representable deadline and never expires.
fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Polls `condition` until it returns true or the deadline elapses.
///
/// The deadline is computed once up front; the interval is fixed. On
/// timeout this returns [`Error::AssertionTimeout`] naming `condition_desc`.
pub async fn poll_until<F, Fut>(condition: F, config: WaitConfig, condition_desc: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now().checked_add(config.timeout);

    loop {
        if condition().await {
            return Ok(());
        }

        if expired(deadline) {
            return Err(Error::AssertionTimeout {
                condition: condition_desc.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Like [`poll_until`], for conditions that can themselves fail.
///
/// A condition error is treated as "not yet" and polling continues; probe
/// failures during page transitions are transient (the document is being
/// replaced under us) and only the deadline is authoritative.
pub async fn poll_until_ok<F, Fut>(
    condition: F,
    config: WaitConfig,
    condition_desc: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now().checked_add(config.timeout);

    loop {
        if matches!(condition().await, Ok(true)) {
            return Ok(());
        }

        if expired(deadline) {
            return Err(Error::AssertionTimeout {
                condition: condition_desc.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn poll_until_succeeds_immediately() {
        let result = poll_until(|| async { true }, WaitConfig::default(), "always true").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn poll_until_succeeds_after_a_few_probes() {
        let counter = Arc::new(AtomicU32::new(0));
        let probe_counter = counter.clone();

        let result = poll_until(
            move || {
                let c = probe_counter.clone();
                async move { c.fetch_add(1, Ordering::SeqCst) >= 3 }
            },
            WaitConfig::new(Duration::from_secs(5), Duration::from_millis(5)),
            "counter reaches 3",
        )
        .await;

        assert!(result.is_ok());
        assert!(counter.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn poll_until_reports_timeout_with_condition() {
        let result = poll_until(
            || async { false },
            WaitConfig::new(Duration::from_millis(50), Duration::from_millis(10)),
            "impossible condition",
        )
        .await;

        match result {
            Err(Error::AssertionTimeout { condition, timeout }) => {
                assert_eq!(condition, "impossible condition");
                assert_eq!(timeout, Duration::from_millis(50));
            }
            other => panic!("expected AssertionTimeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn huge_timeout_does_not_overflow_the_deadline() {
        // Duration::MAX has no representable Instant deadline.
        let config = WaitConfig::with_timeout(Duration::MAX);

        let result = poll_until(|| async { true }, config, "always true").await;
        assert!(result.is_ok());

        let result = poll_until_ok(|| async { Ok(true) }, config, "always true").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn poll_until_ok_keeps_polling_past_transient_errors() {
        let counter = Arc::new(AtomicU32::new(0));
        let probe_counter = counter.clone();

        let result = poll_until_ok(
            move || {
                let c = probe_counter.clone();
                async move {
                    match c.fetch_add(1, Ordering::SeqCst) {
                        0 | 1 => Err(Error::Eval("document is reloading".into())),
                        n => Ok(n >= 3),
                    }
                }
            },
            WaitConfig::new(Duration::from_secs(5), Duration::from_millis(5)),
            "probe settles",
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn poll_until_ok_times_out_on_persistent_errors() {
        let result = poll_until_ok(
            || async { Err::<bool, _>(Error::Eval("broken page".into())) },
            WaitConfig::new(Duration::from_millis(50), Duration::from_millis(10)),
            "never settles",
        )
        .await;

        assert!(matches!(result, Err(Error::AssertionTimeout { .. })));
    }
}
