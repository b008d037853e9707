//! AttentionCueScheduler: a low-priority recurring pulse on the button.
//!
//! On each tick the consent oracle is re-checked; without consent the tick
//! is skipped. The pulse runs inline on the loop task, and the configured
//! period dwarfs the pulse duration, so two pulses never overlap. Exits when
//! the shutdown signal fires.

use crate::config::WidgetConfig;
use crate::consent;
use crate::page::{Page, WidgetPart};
use crate::sequence;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

/// Owner handle for the running pulse loop. Stopping is idempotent; drop
/// aborts outright so the periodic timer can never outlive the page.
pub struct CueHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CueHandle {
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for CueHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start the pulse loop.
pub fn start(page: Arc<dyn Page>, config: Arc<WidgetConfig>) -> CueHandle {
    let (shutdown, mut rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut tick = time::interval(Duration::from_millis(config.heartbeat.interval_ms));
        // the immediate first tick would pulse at t=0; the cue starts one
        // full period in
        tick.tick().await;
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if !page.part_present(WidgetPart::Button) {
                        continue;
                    }
                    if !consent::has_consent(page.as_ref()) {
                        tracing::debug!("skipping attention pulse, no consent");
                        continue;
                    }
                    sequence::run_steps(page.as_ref(), &config, &sequence::pulse_steps(&config)).await;
                }
                _ = rx.changed() => {
                    if *rx.borrow() {
                        tracing::debug!("attention cue stopped");
                        break;
                    }
                }
            }
        }
    });
    CueHandle { shutdown, task }
}
