use super::{ConsentSource, ReadinessSource, WidgetPart, WidgetSurface};
use crate::error::StorageError;
use crate::position::Placement;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// In-memory page: a complete implementation of all three page seams.
///
/// Used by this crate's tests and by embedders that drive the widget from a
/// non-DOM host (server-side rendering checks, headless audits). All state
/// sits behind one mutex; the done signal is a `watch` channel so readiness
/// subscribers see completion exactly like a page event listener would.
pub struct MemoryPage {
    state: Mutex<PageState>,
    done_tx: watch::Sender<bool>,
}

#[derive(Debug)]
struct PageState {
    consent_flag: bool,
    stored_consent: Option<String>,
    storage_broken: bool,
    preload_done: bool,
    preload_indicator: bool,
    button_present: bool,
    caption_present: bool,
    button_visible: bool,
    button_classes: BTreeSet<String>,
    caption_classes: BTreeSet<String>,
    placement: Option<Placement>,
    viewport_height: f64,
    footer_top: Option<f64>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// A fresh page mid-preload: indicator present, no consent recorded,
    /// both widget elements rendered but the button not yet revealed.
    pub fn new() -> Self {
        let (done_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(PageState {
                consent_flag: false,
                stored_consent: None,
                storage_broken: false,
                preload_done: false,
                preload_indicator: true,
                button_present: true,
                caption_present: true,
                button_visible: false,
                button_classes: BTreeSet::new(),
                caption_classes: BTreeSet::new(),
                placement: None,
                viewport_height: 800.0,
                footer_top: None,
            }),
            done_tx,
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Environment mutation (what other page scripts would do) ─────────

    pub fn set_consent_flag(&self, set: bool) {
        self.state().consent_flag = set;
    }

    pub fn set_stored_consent(&self, record: Option<&str>) {
        self.state().stored_consent = record.map(str::to_owned);
    }

    /// Make every storage read fail, as a blocked or quota-exhausted store
    /// would.
    pub fn break_storage(&self) {
        self.state().storage_broken = true;
    }

    /// Finish the preload phase: set the completion flag and fire the done
    /// signal, in that order.
    pub fn finish_preload(&self) {
        self.state().preload_done = true;
        let _ = self.done_tx.send(true);
    }

    /// Set the completion flag without firing the done signal, as a host
    /// that never dispatches the event would.
    pub fn finish_preload_without_signal(&self) {
        self.state().preload_done = true;
    }

    /// Remove the preload indicator entirely (a page that never had one).
    pub fn remove_preload_indicator(&self) {
        self.state().preload_indicator = false;
    }

    pub fn remove_button(&self) {
        self.state().button_present = false;
    }

    pub fn remove_caption(&self) {
        self.state().caption_present = false;
    }

    pub fn set_viewport_height(&self, px: f64) {
        self.state().viewport_height = px;
    }

    pub fn set_footer_top(&self, px: Option<f64>) {
        self.state().footer_top = px;
    }
}

impl ConsentSource for MemoryPage {
    fn consent_flag(&self) -> bool {
        self.state().consent_flag
    }

    fn stored_consent(&self) -> anyhow::Result<Option<String>> {
        let state = self.state();
        if state.storage_broken {
            return Err(StorageError::Read("storage unavailable".into()).into());
        }
        Ok(state.stored_consent.clone())
    }
}

impl ReadinessSource for MemoryPage {
    fn preload_done(&self) -> bool {
        self.state().preload_done
    }

    fn preload_indicator_present(&self) -> bool {
        self.state().preload_indicator
    }

    fn done_signal(&self) -> watch::Receiver<bool> {
        self.done_tx.subscribe()
    }
}

impl WidgetSurface for MemoryPage {
    fn part_present(&self, part: WidgetPart) -> bool {
        let state = self.state();
        match part {
            WidgetPart::Button => state.button_present,
            WidgetPart::Caption => state.caption_present,
        }
    }

    fn set_button_visible(&self, visible: bool) {
        let mut state = self.state();
        if state.button_present {
            state.button_visible = visible;
        }
    }

    fn button_visible(&self) -> bool {
        self.state().button_visible
    }

    fn add_class(&self, part: WidgetPart, class: &str) {
        let mut state = self.state();
        match part {
            WidgetPart::Button if state.button_present => {
                state.button_classes.insert(class.to_owned());
            }
            WidgetPart::Caption if state.caption_present => {
                state.caption_classes.insert(class.to_owned());
            }
            _ => {}
        }
    }

    fn remove_class(&self, part: WidgetPart, class: &str) {
        let mut state = self.state();
        match part {
            WidgetPart::Button => {
                state.button_classes.remove(class);
            }
            WidgetPart::Caption => {
                state.caption_classes.remove(class);
            }
        }
    }

    fn has_class(&self, part: WidgetPart, class: &str) -> bool {
        let state = self.state();
        match part {
            WidgetPart::Button => state.button_classes.contains(class),
            WidgetPart::Caption => state.caption_classes.contains(class),
        }
    }

    fn apply_placement(&self, placement: &Placement) {
        let mut state = self.state();
        if state.button_present {
            state.placement = Some(*placement);
        }
    }

    fn current_placement(&self) -> Option<Placement> {
        self.state().placement
    }

    fn viewport_height(&self) -> f64 {
        self.state().viewport_height
    }

    fn footer_top(&self) -> Option<f64> {
        self.state().footer_top
    }
}
