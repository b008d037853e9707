//! ReadinessWaiter: resolve once the page's preload phase is known finished.
//!
//! Two strategies race: a subscription to the page's done signal, and a
//! bounded poll against the completion predicate. Whichever wins first
//! returns; the loser is dropped on the spot. Exceeding the wait bound is
//! not an error — the widget proceeds on a degraded-but-safe path.

use crate::config::WidgetConfig;
use crate::page::ReadinessSource;
use tokio::time;

/// Why a readiness wait resolved. Diagnostic only: every variant means
/// "proceed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyCause {
    /// Preload was already finished when the wait started.
    AlreadyDone,
    /// The done signal fired.
    Signaled,
    /// The poll path observed completion.
    Polled,
    /// The wait bound elapsed without any completion evidence.
    TimedOut,
}

/// Completion predicate: the explicit flag is set, or there is no preload
/// indicator on the page at all (nothing to wait for).
pub fn preload_complete(source: &dyn ReadinessSource) -> bool {
    source.preload_done() || !source.preload_indicator_present()
}

/// Wait until the preload phase is finished, or until `max_wait` elapses.
///
/// The settle delay is applied after every positive completion (signal,
/// poll, already-done) so concurrent DOM work can finish; the timeout path
/// skips it and proceeds immediately. Single-fire across multiple trigger
/// paths is the caller's responsibility — this function may be invoked once
/// per cycle over the widget's life.
pub async fn await_ready(source: &dyn ReadinessSource, config: &WidgetConfig) -> ReadyCause {
    if preload_complete(source) {
        settle(config).await;
        return ReadyCause::AlreadyDone;
    }

    let mut signal = source.done_signal();
    let mut signal_open = true;
    let mut poll = time::interval(config.poll_interval());
    let deadline = time::sleep(config.max_wait());
    tokio::pin!(deadline);
    let started = time::Instant::now();

    loop {
        tokio::select! {
            observed = async { signal.wait_for(|done| *done).await.map(|_| ()) }, if signal_open => {
                match observed {
                    Ok(_) => {
                        tracing::debug!(
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "preload done signal received"
                        );
                        settle(config).await;
                        return ReadyCause::Signaled;
                    }
                    // Sender gone; the poll path keeps covering us.
                    Err(_) => signal_open = false,
                }
            }
            _ = poll.tick() => {
                if preload_complete(source) {
                    tracing::debug!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "preload completion observed by poll"
                    );
                    settle(config).await;
                    return ReadyCause::Polled;
                }
            }
            () = &mut deadline => {
                tracing::warn!(
                    max_wait_ms = config.readiness.max_wait_ms,
                    "preload wait timed out, proceeding anyway"
                );
                return ReadyCause::TimedOut;
            }
        }
    }
}

async fn settle(config: &WidgetConfig) {
    time::sleep(config.safety_delay()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;
    use std::sync::Arc;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn already_done_resolves_after_settle_only() {
        let page = MemoryPage::new();
        page.finish_preload();
        let config = WidgetConfig::default();

        let started = time::Instant::now();
        let cause = await_ready(&page, &config).await;

        assert_eq!(cause, ReadyCause::AlreadyDone);
        assert_eq!(started.elapsed(), ms(500));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_indicator_means_nothing_to_wait_for() {
        let page = MemoryPage::new();
        page.remove_preload_indicator();
        let config = WidgetConfig::default();

        let cause = await_ready(&page, &config).await;
        assert_eq!(cause, ReadyCause::AlreadyDone);
    }

    #[tokio::test(start_paused = true)]
    async fn signal_path_wins_and_settles() {
        let page = Arc::new(MemoryPage::new());
        let config = WidgetConfig::default();

        let waiter = {
            let page = Arc::clone(&page);
            tokio::spawn(async move {
                let started = time::Instant::now();
                let cause = await_ready(page.as_ref(), &config).await;
                (cause, started.elapsed())
            })
        };

        time::sleep(ms(250)).await;
        page.finish_preload();

        let (cause, elapsed) = waiter.await.unwrap();
        // the poll path also sees the flag, but the signal is observed first
        assert_eq!(cause, ReadyCause::Signaled);
        assert_eq!(elapsed, ms(750));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_path_observes_flag_when_no_signal_fires() {
        let page = Arc::new(MemoryPage::new());
        let config = WidgetConfig::default();

        let waiter = {
            let page = Arc::clone(&page);
            tokio::spawn(async move {
                let started = time::Instant::now();
                let cause = await_ready(page.as_ref(), &config).await;
                (cause, started.elapsed())
            })
        };

        // flag only, no signal: a host that never fires the event
        time::sleep(ms(230)).await;
        page.finish_preload_without_signal();

        let (cause, elapsed) = waiter.await.unwrap();
        assert_eq!(cause, ReadyCause::Polled);
        // next poll tick at 300 ms, then the settle delay
        assert_eq!(elapsed, ms(800));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_at_the_bound_not_earlier() {
        let page = MemoryPage::new();
        let config = WidgetConfig::default();

        let started = time::Instant::now();
        let cause = await_ready(&page, &config).await;

        assert_eq!(cause, ReadyCause::TimedOut);
        // no settle delay on the timeout path
        assert_eq!(started.elapsed(), ms(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn signal_fired_before_subscription_is_not_lost() {
        let page = MemoryPage::new();
        let config = WidgetConfig::default();

        page.finish_preload();
        // a second waiter cycle subscribing after the fact
        let cause = await_ready(&page, &config).await;
        assert_eq!(cause, ReadyCause::AlreadyDone);
    }
}
