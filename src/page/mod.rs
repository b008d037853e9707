//! The seam between the coordinator and the hosting page.
//!
//! The widget never touches ambient globals. Everything it reads (consent
//! flag, preload state, geometry) and everything it writes (visibility,
//! classes, placement) goes through these three narrow traits, so a real DOM
//! binding and the in-memory test page are interchangeable.

use crate::position::Placement;
use tokio::sync::watch;

pub mod memory;

pub use memory::MemoryPage;

// ─── Class vocabulary ───────────────────────────────────────────────────────

/// Entrance-animation class added shortly after the button is revealed.
pub const SHOW_CLASS: &str = "show";
/// Caption fade-out class.
pub const CAPTION_FADE_CLASS: &str = "hide-text";
/// Caption fully-removed class, added after the fade completes.
pub const CAPTION_GONE_CLASS: &str = "completely-hidden";
/// Emphasis class toggled by the attention pulse.
pub const PULSE_CLASS: &str = "pulse";

/// The two page elements the widget owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetPart {
    Button,
    Caption,
}

// ─── Environment reads ──────────────────────────────────────────────────────

/// Where the consent decision comes from. Read live on every call — consent
/// can change mid-session and must never be cached.
pub trait ConsentSource: Send + Sync {
    /// Document-level consent flag. Authoritative when set.
    fn consent_flag(&self) -> bool;

    /// Raw persisted consent record (JSON), if any. Read failures are
    /// reported as errors and treated by the oracle as "no consent".
    fn stored_consent(&self) -> anyhow::Result<Option<String>>;
}

/// Where the preload-completion state comes from.
///
/// Implementations must set the completion flag no later than firing the
/// done signal; the poll path relies on the flag to catch signals that fire
/// before anyone subscribes.
pub trait ReadinessSource: Send + Sync {
    /// Explicit "preload finished" flag.
    fn preload_done(&self) -> bool;

    /// Whether a preload indicator exists at all. Absence means there was
    /// never anything to wait for.
    fn preload_indicator_present(&self) -> bool;

    /// Completion signal. The receiver observes `true` once preloading
    /// finishes; the value never reverts within a page lifetime.
    fn done_signal(&self) -> watch::Receiver<bool>;
}

// ─── Widget writes ──────────────────────────────────────────────────────────

/// Style and class writes against the widget elements, plus the two geometry
/// reads positioning needs. Lookups happen per call; a missing element makes
/// the corresponding write a no-op.
pub trait WidgetSurface: Send + Sync {
    fn part_present(&self, part: WidgetPart) -> bool;

    fn set_button_visible(&self, visible: bool);

    /// Whether the button is currently revealed. Diagnostic read-back.
    fn button_visible(&self) -> bool;

    fn add_class(&self, part: WidgetPart, class: &str);

    fn remove_class(&self, part: WidgetPart, class: &str);

    fn has_class(&self, part: WidgetPart, class: &str) -> bool;

    fn apply_placement(&self, placement: &Placement);

    /// Last placement written, if any. Diagnostic read-back.
    fn current_placement(&self) -> Option<Placement>;

    fn viewport_height(&self) -> f64;

    /// Footer top edge relative to the viewport top, or `None` when the page
    /// has no footer.
    fn footer_top(&self) -> Option<f64>;
}

/// Convenience umbrella for callers that hold one object implementing all
/// three seams (the usual case).
pub trait Page: ConsentSource + ReadinessSource + WidgetSurface {}

impl<T: ConsentSource + ReadinessSource + WidgetSurface> Page for T {}
