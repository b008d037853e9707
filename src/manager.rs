//! WidgetManager: the public surface other page scripts call.
//!
//! A thin adapter over the coordinator, position engine, heartbeat and
//! oracle. Every entry point is safe to call at any time; failures degrade
//! to a hidden widget and a log line, never to a propagated error.

use crate::config::{ConfigHandle, WidgetConfig};
use crate::consent;
use crate::coordinator::{ActivationCoordinator, ActivationState};
use crate::error::Result;
use crate::heartbeat::{self, CueHandle};
use crate::page::{CAPTION_FADE_CLASS, CAPTION_GONE_CLASS, Page, WidgetPart};
use crate::position::{self, Placement};
use crate::readiness;
use crate::sequence::{self, SequenceHandle};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub struct WidgetManager {
    page: Arc<dyn Page>,
    config: ConfigHandle,
    coordinator: Arc<ActivationCoordinator>,
    cue: Mutex<Option<CueHandle>>,
    caption_sequence: Mutex<Option<SequenceHandle>>,
    pulse_sequence: Mutex<Option<SequenceHandle>>,
}

impl WidgetManager {
    pub fn new(page: Arc<dyn Page>, config: WidgetConfig) -> Self {
        Self::with_handle(page, ConfigHandle::new(config))
    }

    /// Build against a live config handle; hot reloads take effect from the
    /// next cycle or pulse.
    pub fn with_handle(page: Arc<dyn Page>, config: ConfigHandle) -> Self {
        let coordinator = Arc::new(ActivationCoordinator::new(
            Arc::clone(&page),
            config.clone(),
        ));
        Self {
            page,
            config,
            coordinator,
            cue: Mutex::new(None),
            caption_sequence: Mutex::new(None),
            pulse_sequence: Mutex::new(None),
        }
    }

    /// Entry point, called once at page load. Idempotent, and never lets an
    /// error escape into the hosting page's script execution.
    pub fn initialize(&self) {
        if let Err(e) = self.try_initialize() {
            tracing::error!("widget initialization failed: {e}");
        }
    }

    fn try_initialize(&self) -> Result<()> {
        let config = self.config.load_full();
        config.validate()?;

        self.coordinator.initialize();

        if config.heartbeat.enabled {
            let mut cue = self.lock_cue();
            if cue.is_none() {
                *cue = Some(heartbeat::start(Arc::clone(&self.page), config));
            }
        }
        Ok(())
    }

    /// Force a fresh readiness-plus-consent cycle. The supported retry path
    /// after a consent change.
    pub fn reinitialize(&self) {
        self.coordinator.reinitialize();
    }

    /// Manual reveal; still gated on consent.
    pub fn show_button(&self) {
        self.coordinator.show_button();
    }

    pub fn hide_button(&self) {
        self.coordinator.hide_button();
    }

    /// Force an immediate placement recompute. Wire this to scroll, resize,
    /// orientation-change and visibility-regained events.
    pub fn position_button(&self) {
        position::recompute(self.page.as_ref(), &self.config.load());
    }

    /// The oracle's live answer, for external callers such as a
    /// consent-banner script.
    pub fn check_consent(&self) -> bool {
        consent::has_consent(self.page.as_ref())
    }

    /// Restore the caption, cancelling a pending auto-hide so it cannot
    /// re-hide what was just shown.
    pub fn show_caption(&self) {
        if let Some(handle) = self.lock_caption_sequence().take() {
            handle.cancel();
        }
        self.page
            .remove_class(WidgetPart::Caption, CAPTION_FADE_CLASS);
        self.page
            .remove_class(WidgetPart::Caption, CAPTION_GONE_CLASS);
    }

    /// One manual attention pulse, outside the recurring schedule. Gated
    /// exactly like a scheduled tick; a still-running pulse is superseded.
    pub fn pulse(&self) {
        if !self.page.part_present(WidgetPart::Button) {
            tracing::warn!("contact button not found, pulse skipped");
            return;
        }
        if !consent::has_consent(self.page.as_ref()) {
            tracing::info!("skipping manual pulse, no consent");
            return;
        }
        let config = self.config.load_full();
        let steps = sequence::pulse_steps(&config);
        let handle = sequence::spawn(Arc::clone(&self.page), config, steps);
        *self.lock_pulse_sequence() = Some(handle);
    }

    /// Start the caption auto-hide sequence, superseding a pending one.
    pub fn hide_caption(&self) {
        let config = self.config.load_full();
        let steps = sequence::caption_hide_steps(&config);
        let handle = sequence::spawn(Arc::clone(&self.page), config, steps);
        *self.lock_caption_sequence() = Some(handle);
    }

    /// Page teardown: stop the heartbeat and cancel every pending sequence.
    /// Call exactly once at unload.
    pub fn shutdown(&self) {
        if let Some(cue) = self.lock_cue().take() {
            cue.stop();
        }
        if let Some(handle) = self.lock_caption_sequence().take() {
            handle.cancel();
        }
        if let Some(handle) = self.lock_pulse_sequence().take() {
            handle.cancel();
        }
        self.coordinator.shutdown();
    }

    /// Read-only diagnostic snapshot. No side effects.
    pub fn debug(&self) -> DebugReport {
        let page = self.page.as_ref();
        DebugReport {
            button_present: page.part_present(WidgetPart::Button),
            caption_present: page.part_present(WidgetPart::Caption),
            preload_indicator_present: page.preload_indicator_present(),
            preload_complete: readiness::preload_complete(page),
            consent_flag: page.consent_flag(),
            has_consent: consent::has_consent(page),
            activation_state: self.coordinator.state(),
            activation_fired: self.coordinator.has_fired(),
            heartbeat_running: self
                .lock_cue()
                .as_ref()
                .is_some_and(CueHandle::is_running),
            button_visible: page.button_visible(),
            placement: page.current_placement(),
        }
    }

    fn lock_cue(&self) -> MutexGuard<'_, Option<CueHandle>> {
        self.cue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_caption_sequence(&self) -> MutexGuard<'_, Option<SequenceHandle>> {
        self.caption_sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pulse_sequence(&self) -> MutexGuard<'_, Option<SequenceHandle>> {
        self.pulse_sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Snapshot of everything worth knowing when the widget misbehaves.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DebugReport {
    pub button_present: bool,
    pub caption_present: bool,
    pub preload_indicator_present: bool,
    pub preload_complete: bool,
    pub consent_flag: bool,
    pub has_consent: bool,
    pub activation_state: ActivationState,
    pub activation_fired: bool,
    pub heartbeat_running: bool,
    pub button_visible: bool,
    pub placement: Option<Placement>,
}
