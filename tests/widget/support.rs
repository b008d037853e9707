use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a test-writer subscriber so widget tracing shows up in failing
/// test output. Safe to call from every test; later calls are no-ops.
pub fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
