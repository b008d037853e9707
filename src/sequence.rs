//! Declarative delayed-step sequences.
//!
//! Every timed class dance in the widget (entrance animation, caption
//! auto-hide, attention pulse) is a list of `{delay, action}` steps executed
//! by this one runner, instead of ad hoc nested timers. A spawned sequence
//! hands back a single cancellation handle; dropping the handle cancels the
//! sequence, so a superseded sequence can never fire late.

use crate::config::WidgetConfig;
use crate::page::{Page, WidgetPart};
use crate::position;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

#[derive(Debug, Clone, Copy)]
pub enum StepAction {
    ShowButton,
    HideButton,
    AddClass(WidgetPart, &'static str),
    RemoveClass(WidgetPart, &'static str),
    Reposition,
}

/// One step: wait `delay` (relative to the previous step), then act.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub delay: Duration,
    pub action: StepAction,
}

impl Step {
    pub fn after_ms(delay_ms: u64, action: StepAction) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            action,
        }
    }
}

/// Execute the steps inline on the current task.
pub async fn run_steps(page: &dyn Page, config: &WidgetConfig, steps: &[Step]) {
    for step in steps {
        if !step.delay.is_zero() {
            time::sleep(step.delay).await;
        }
        apply(page, config, step.action);
    }
}

/// Execute the steps on a background task; the returned handle cancels it.
pub fn spawn(page: Arc<dyn Page>, config: Arc<WidgetConfig>, steps: Vec<Step>) -> SequenceHandle {
    let task = tokio::spawn(async move {
        run_steps(page.as_ref(), &config, &steps).await;
    });
    SequenceHandle { task }
}

// ─── The widget's sequences ─────────────────────────────────────────────────

/// Full activation dance: reveal, entrance class, first position pass, then
/// the caption auto-hide.
pub fn entrance_steps(config: &WidgetConfig) -> Vec<Step> {
    let a = &config.animation;
    vec![
        Step::after_ms(0, StepAction::ShowButton),
        Step::after_ms(
            a.entrance_class_delay_ms,
            StepAction::AddClass(WidgetPart::Button, crate::page::SHOW_CLASS),
        ),
        Step::after_ms(
            a.entrance_position_delay_ms
                .saturating_sub(a.entrance_class_delay_ms),
            StepAction::Reposition,
        ),
        Step::after_ms(
            a.caption_sequence_delay_ms
                .saturating_sub(a.entrance_position_delay_ms)
                + a.caption_fade_delay_ms,
            StepAction::AddClass(WidgetPart::Caption, crate::page::CAPTION_FADE_CLASS),
        ),
        Step::after_ms(
            a.caption_gone_delay_ms,
            StepAction::AddClass(WidgetPart::Caption, crate::page::CAPTION_GONE_CLASS),
        ),
    ]
}

/// Caption auto-hide on its own, for the manual caption control.
pub fn caption_hide_steps(config: &WidgetConfig) -> Vec<Step> {
    let a = &config.animation;
    vec![
        Step::after_ms(
            a.caption_fade_delay_ms,
            StepAction::AddClass(WidgetPart::Caption, crate::page::CAPTION_FADE_CLASS),
        ),
        Step::after_ms(
            a.caption_gone_delay_ms,
            StepAction::AddClass(WidgetPart::Caption, crate::page::CAPTION_GONE_CLASS),
        ),
    ]
}

/// One attention pulse: clear the emphasis class, re-add it briefly, clear
/// it again so the next pulse replays identically.
pub fn pulse_steps(config: &WidgetConfig) -> Vec<Step> {
    let h = &config.heartbeat;
    vec![
        Step::after_ms(
            0,
            StepAction::RemoveClass(WidgetPart::Button, crate::page::PULSE_CLASS),
        ),
        Step::after_ms(
            h.pulse_add_delay_ms,
            StepAction::AddClass(WidgetPart::Button, crate::page::PULSE_CLASS),
        ),
        Step::after_ms(
            h.pulse_remove_delay_ms,
            StepAction::RemoveClass(WidgetPart::Button, crate::page::PULSE_CLASS),
        ),
    ]
}

fn apply(page: &dyn Page, config: &WidgetConfig, action: StepAction) {
    match action {
        StepAction::ShowButton => page.set_button_visible(true),
        StepAction::HideButton => page.set_button_visible(false),
        StepAction::AddClass(part, class) => page.add_class(part, class),
        StepAction::RemoveClass(part, class) => page.remove_class(part, class),
        StepAction::Reposition => position::recompute(page, config),
    }
}

/// Owner handle for a spawned sequence. Cancellation is idempotent and also
/// happens on drop, so pending steps never outlive their owner.
pub struct SequenceHandle {
    task: JoinHandle<()>,
}

impl SequenceHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SequenceHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
