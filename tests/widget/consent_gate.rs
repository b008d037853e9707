use contact_beacon::page::{Page, WidgetSurface};
use contact_beacon::{ActivationState, MemoryPage, WidgetConfig, WidgetManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn manager(page: &Arc<MemoryPage>) -> WidgetManager {
    crate::support::init_tracing();
    WidgetManager::new(Arc::clone(page) as Arc<dyn Page>, WidgetConfig::default())
}

#[tokio::test(start_paused = true)]
async fn check_consent_truth_table() {
    let flag_set = Arc::new(MemoryPage::new());
    flag_set.set_consent_flag(true);
    assert!(manager(&flag_set).check_consent());

    let record_true = Arc::new(MemoryPage::new());
    record_true.set_stored_consent(Some(r#"{"hasConsented":true}"#));
    assert!(manager(&record_true).check_consent());

    let record_false = Arc::new(MemoryPage::new());
    record_false.set_stored_consent(Some(r#"{"hasConsented":false}"#));
    assert!(!manager(&record_false).check_consent());

    let nothing = Arc::new(MemoryPage::new());
    assert!(!manager(&nothing).check_consent());
}

#[tokio::test(start_paused = true)]
async fn no_consent_keeps_widget_hidden_with_no_auto_retry() {
    let page = Arc::new(MemoryPage::new());
    let manager = manager(&page);

    manager.initialize();
    page.finish_preload();
    time::sleep(ms(5_000)).await;

    let report = manager.debug();
    assert_eq!(report.activation_state, ActivationState::WaitingForReadiness);
    assert!(!report.button_visible);
    assert!(!report.activation_fired);

    // consent arriving later changes nothing by itself
    page.set_consent_flag(true);
    time::sleep(ms(5_000)).await;
    assert!(!page.button_visible());

    manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn reinitialize_after_consent_change_reveals_the_widget() {
    let page = Arc::new(MemoryPage::new());
    let manager = manager(&page);

    manager.initialize();
    page.finish_preload();
    time::sleep(ms(2_000)).await;
    assert!(!page.button_visible());

    page.set_stored_consent(Some(r#"{"hasConsented":true}"#));
    manager.reinitialize();

    // one readiness cycle: already done, settle, activate
    time::sleep(ms(2_000)).await;
    assert!(page.button_visible());
    assert_eq!(manager.debug().activation_state, ActivationState::Activated);
    assert!(page.current_placement().is_some());

    manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn show_button_after_opt_in_activates() {
    let page = Arc::new(MemoryPage::new());
    let manager = manager(&page);

    manager.initialize();
    page.finish_preload();
    time::sleep(ms(2_000)).await;
    assert!(!page.button_visible());

    // the consent banner flips the flag, then calls in
    page.set_consent_flag(true);
    manager.show_button();
    time::sleep(ms(2_500)).await;

    assert!(page.button_visible());
    assert_eq!(manager.debug().activation_state, ActivationState::Activated);

    manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn show_button_without_consent_is_refused() {
    let page = Arc::new(MemoryPage::new());
    page.finish_preload();
    let manager = manager(&page);

    manager.initialize();
    manager.show_button();
    time::sleep(ms(2_000)).await;

    assert!(!page.button_visible());
    manager.shutdown();
}

#[tokio::test(start_paused = true)]
async fn recompute_without_consent_hides_despite_footer_geometry() {
    let page = Arc::new(MemoryPage::new());
    page.set_footer_top(Some(400.0));
    let manager = manager(&page);

    page.set_button_visible(true);
    manager.position_button();

    assert!(!page.button_visible());
    assert_eq!(page.current_placement(), None);
}

#[tokio::test(start_paused = true)]
async fn broken_storage_degrades_to_hidden() {
    let page = Arc::new(MemoryPage::new());
    page.set_stored_consent(Some(r#"{"hasConsented":true}"#));
    page.break_storage();
    let manager = manager(&page);

    manager.initialize();
    page.finish_preload();
    time::sleep(ms(2_000)).await;

    assert!(!manager.check_consent());
    assert!(!page.button_visible());
    manager.shutdown();
}
