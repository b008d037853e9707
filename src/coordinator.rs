//! ActivationCoordinator: the state machine gating widget activation.
//!
//! Activation requires both readiness (the preload phase is over) and
//! consent. Readiness is awaited once per cycle; consent is re-checked at
//! the moment of activation. A single boolean latch guarantees the entrance
//! side effects fire at most once per cycle no matter how many trigger paths
//! (readiness callback, manual calls) land here.

use crate::config::ConfigHandle;
use crate::consent;
use crate::page::{Page, SHOW_CLASS, WidgetPart};
use crate::readiness::{self, ReadyCause};
use crate::sequence::{self, SequenceHandle};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lifecycle of the widget within one page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    Idle,
    WaitingForReadiness,
    Activated,
}

pub struct ActivationCoordinator {
    page: Arc<dyn Page>,
    config: ConfigHandle,
    state: Mutex<ActivationState>,
    /// Single-fire latch for the current readiness cycle. Re-armed only by
    /// [`ActivationCoordinator::reinitialize`].
    fired: AtomicBool,
    /// The in-flight readiness wait. A fresh cycle supersedes (aborts) the
    /// previous one rather than mutating it.
    cycle: Mutex<Option<tokio::task::JoinHandle<()>>>,
    entrance: Mutex<Option<SequenceHandle>>,
}

impl ActivationCoordinator {
    pub fn new(page: Arc<dyn Page>, config: ConfigHandle) -> Self {
        Self {
            page,
            config,
            state: Mutex::new(ActivationState::Idle),
            fired: AtomicBool::new(false),
            cycle: Mutex::new(None),
            entrance: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ActivationState {
        *self.lock_state()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Begin the first activation cycle. Idempotent: repeated calls after
    /// the first are no-ops.
    pub fn initialize(self: &Arc<Self>) {
        {
            let mut state = self.lock_state();
            if *state != ActivationState::Idle {
                tracing::debug!(state = ?*state, "initialize called again, ignoring");
                return;
            }
            *state = ActivationState::WaitingForReadiness;
        }

        // Hidden until readiness and consent both hold; prevents a flash of
        // the button while the preloader is still up.
        self.page.set_button_visible(false);
        self.spawn_cycle();
    }

    /// Start a fresh readiness cycle, re-arming the single-fire latch. The
    /// supported retry path after a consent change.
    pub fn reinitialize(self: &Arc<Self>) {
        tracing::info!("manual reinitialize requested");
        self.cancel_entrance();
        self.fired.store(false, Ordering::SeqCst);
        *self.lock_state() = ActivationState::WaitingForReadiness;
        self.page.set_button_visible(false);
        self.spawn_cycle();
    }

    /// Manual reveal. Respects the consent gate; if the preload phase is
    /// still running, waits for it like an ordinary cycle.
    pub fn show_button(self: &Arc<Self>) {
        if !consent::has_consent(self.page.as_ref()) {
            tracing::info!("cannot show button without consent");
            return;
        }

        if self.has_fired() {
            // Already activated once: just re-reveal.
            self.page.set_button_visible(true);
            self.page.add_class(WidgetPart::Button, SHOW_CLASS);
            crate::position::recompute(self.page.as_ref(), &self.config.load());
            return;
        }

        {
            let mut state = self.lock_state();
            if *state == ActivationState::Idle {
                *state = ActivationState::WaitingForReadiness;
            }
        }

        if readiness::preload_complete(self.page.as_ref()) {
            self.on_ready(ReadyCause::AlreadyDone);
        } else {
            tracing::info!("preload still active, waiting before manual show");
            self.spawn_cycle();
        }
    }

    /// Manual hide. Also resets the caption classes so a later reveal
    /// replays the caption cycle from the start.
    pub fn hide_button(&self) {
        self.cancel_entrance();
        self.page.set_button_visible(false);
        self.page.remove_class(WidgetPart::Button, SHOW_CLASS);
        self.page
            .remove_class(WidgetPart::Caption, crate::page::CAPTION_FADE_CLASS);
        self.page
            .remove_class(WidgetPart::Caption, crate::page::CAPTION_GONE_CLASS);
    }

    /// Release every pending timer: the in-flight readiness wait and any
    /// pending entrance steps. Called on teardown.
    pub fn shutdown(&self) {
        if let Some(task) = self.lock_cycle().take() {
            task.abort();
        }
        self.cancel_entrance();
    }

    fn spawn_cycle(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            let config = this.config.load_full();
            let cause = readiness::await_ready(this.page.as_ref(), &config).await;
            this.on_ready(cause);
        });
        if let Some(previous) = self.lock_cycle().replace(task) {
            previous.abort();
        }
    }

    /// Readiness callback: the `WaitingForReadiness → Activated` transition.
    ///
    /// Without consent the state deliberately stays put and the widget stays
    /// hidden; no retry is scheduled — a consent-banner script is expected
    /// to call back in through the facade.
    fn on_ready(&self, cause: ReadyCause) {
        if !self.page.part_present(WidgetPart::Button) {
            tracing::warn!("contact button not found, activation skipped");
            return;
        }

        if !consent::has_consent(self.page.as_ref()) {
            tracing::info!(?cause, "no consent at readiness, widget stays hidden");
            self.page.set_button_visible(false);
            return;
        }

        if self.fired.swap(true, Ordering::SeqCst) {
            tracing::debug!(?cause, "activation already fired this cycle");
            return;
        }

        tracing::info!(?cause, "activating contact widget");
        *self.lock_state() = ActivationState::Activated;

        let config = self.config.load_full();
        let steps = sequence::entrance_steps(&config);
        let handle = sequence::spawn(Arc::clone(&self.page), config, steps);
        *self.lock_entrance() = Some(handle);
    }

    fn cancel_entrance(&self) {
        if let Some(handle) = self.lock_entrance().take() {
            handle.cancel();
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ActivationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_entrance(&self) -> MutexGuard<'_, Option<SequenceHandle>> {
        self.entrance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cycle(&self) -> MutexGuard<'_, Option<tokio::task::JoinHandle<()>>> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
