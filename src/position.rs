//! PositionEngine: keep the button clear of the footer as the page scrolls.
//!
//! `compute` is pure; `recompute` is the thin applier invoked on scroll,
//! resize, orientation-change and visibility-regained events. It performs one
//! geometry read and a handful of style writes, nothing more — it runs on
//! high-frequency events and later runs safely overwrite earlier ones.

use crate::config::{GeometryConfig, WidgetConfig};
use crate::consent;
use crate::page::{Page, WidgetPart};
use serde::Serialize;

/// Which viewport edge the button is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Distance from the viewport top; bottom is `auto`.
    Top(f64),
    /// Distance from the viewport bottom; top is `auto`.
    Bottom(f64),
}

/// Fixed-position placement for the button. Derived fresh on every
/// recompute, never stored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub right_px: f64,
    pub anchor: Anchor,
}

/// Pure placement computation.
///
/// With no footer, or with the footer below the viewport, the button sits at
/// the constant bottom inset. Once the footer's top edge enters the viewport
/// the button's top edge tracks it upward, clamped so it never leaves the
/// viewport.
pub fn compute(
    viewport_height: f64,
    footer_top: Option<f64>,
    geometry: &GeometryConfig,
) -> Placement {
    let anchor = match footer_top {
        Some(top) if top < viewport_height => {
            let raised = (top - geometry.widget_height_px).max(geometry.min_top_px);
            Anchor::Top(raised)
        }
        _ => Anchor::Bottom(geometry.bottom_inset_px),
    };
    Placement {
        right_px: geometry.right_inset_px,
        anchor,
    }
}

/// Recompute and apply the button's placement against the live page.
///
/// Position is irrelevant while hidden: without consent this hides the
/// button and returns. A missing button is logged and skipped.
pub fn recompute(page: &dyn Page, config: &WidgetConfig) {
    if !page.part_present(WidgetPart::Button) {
        tracing::warn!("contact button not found for positioning");
        return;
    }

    if !consent::has_consent(page) {
        page.set_button_visible(false);
        return;
    }

    let placement = compute(page.viewport_height(), page.footer_top(), &config.geometry);
    page.apply_placement(&placement);
}
