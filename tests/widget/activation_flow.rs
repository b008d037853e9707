use contact_beacon::page::{SHOW_CLASS, WidgetPart, WidgetSurface};
use contact_beacon::position::Anchor;
use contact_beacon::{ActivationState, MemoryPage, WidgetConfig, WidgetManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn manager(page: &Arc<MemoryPage>) -> WidgetManager {
    crate::support::init_tracing();
    WidgetManager::new(
        Arc::clone(page) as Arc<dyn contact_beacon::page::Page>,
        WidgetConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn entrance_timeline_follows_the_configured_delays() {
    let page = Arc::new(MemoryPage::new());
    page.set_consent_flag(true);
    page.set_footer_top(Some(400.0));
    let manager = manager(&page);

    manager.initialize();
    time::sleep(ms(250)).await;
    page.finish_preload();

    // settle delay: nothing visible yet
    time::sleep(ms(400)).await;
    assert!(!page.button_visible());

    // activation lands at 750 ms; entrance class follows 100 ms later
    time::sleep(ms(150)).await;
    assert!(page.button_visible());
    assert!(!page.has_class(WidgetPart::Button, SHOW_CLASS));

    time::sleep(ms(150)).await;
    assert!(page.has_class(WidgetPart::Button, SHOW_CLASS));

    // first position pass at +200 ms
    time::sleep(ms(100)).await;
    let placement = page.current_placement().unwrap();
    assert_eq!(placement.anchor, Anchor::Top(320.0));

    // caption auto-hide at +1300 ms and +1800 ms
    time::sleep(ms(1_200)).await;
    assert!(page.has_class(WidgetPart::Caption, "hide-text"));
    assert!(!page.has_class(WidgetPart::Caption, "completely-hidden"));

    time::sleep(ms(600)).await;
    assert!(page.has_class(WidgetPart::Caption, "completely-hidden"));

    manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn repeated_initialize_and_double_trigger_activate_once() {
    let page = Arc::new(MemoryPage::new());
    page.set_consent_flag(true);
    let manager = manager(&page);

    manager.initialize();
    manager.initialize();
    manager.initialize();

    // both the signal and the completion flag fire
    page.finish_preload();
    time::sleep(ms(3_000)).await;

    assert_eq!(manager.debug().activation_state, ActivationState::Activated);
    assert!(page.has_class(WidgetPart::Button, SHOW_CLASS));

    // no second entrance sequence is pending: a manual class removal stays
    // removed
    page.remove_class(WidgetPart::Button, SHOW_CLASS);
    time::sleep(ms(5_000)).await;
    assert!(!page.has_class(WidgetPart::Button, SHOW_CLASS));

    manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn timeout_fallback_activates_at_the_bound() {
    let page = Arc::new(MemoryPage::new());
    page.set_consent_flag(true);
    let manager = manager(&page);

    manager.initialize();

    // indicator present, no flag, no signal: only the timeout can resolve
    time::sleep(ms(9_900)).await;
    assert!(!page.button_visible());

    time::sleep(ms(200)).await;
    assert!(page.button_visible());
    assert_eq!(manager.debug().activation_state, ActivationState::Activated);

    manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn position_button_tracks_viewport_changes() {
    let page = Arc::new(MemoryPage::new());
    page.set_consent_flag(true);
    page.remove_preload_indicator();
    let manager = manager(&page);

    manager.initialize();
    time::sleep(ms(1_000)).await;

    manager.position_button();
    assert_eq!(
        page.current_placement().unwrap().anchor,
        Anchor::Bottom(35.0)
    );

    // footer scrolls into view
    page.set_footer_top(Some(500.0));
    manager.position_button();
    assert_eq!(page.current_placement().unwrap().anchor, Anchor::Top(420.0));

    // and back out again
    page.set_footer_top(Some(2_000.0));
    manager.position_button();
    assert_eq!(
        page.current_placement().unwrap().anchor,
        Anchor::Bottom(35.0)
    );

    manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn debug_is_side_effect_free() {
    let page = Arc::new(MemoryPage::new());
    let manager = manager(&page);

    let before = manager.debug();
    let after = manager.debug();

    assert_eq!(before.activation_state, after.activation_state);
    assert!(!after.button_visible);
    assert!(!after.preload_complete);
    assert!(after.preload_indicator_present);
}
