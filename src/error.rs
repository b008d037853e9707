use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `contact-beacon`.
///
/// Nothing in this crate is fatal to the embedding page: public entry points
/// catch and log these instead of propagating them. The hierarchy exists so
/// library callers can still match on cause when they want to.
#[derive(Debug, Error)]
pub enum WidgetError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Persisted consent storage ───────────────────────────────────────
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Consent storage errors ──────────────────────────────────────────────────

/// Failures reading the persisted consent record. Always downgraded to
/// "no consent" by the oracle, never surfaced to the page.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("read failed: {0}")]
    Read(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_correctly() {
        let err = WidgetError::Config(ConfigError::Validation("poll interval is zero".into()));
        assert!(err.to_string().contains("validation failed"));
        assert!(err.to_string().contains("poll interval"));
    }

    #[test]
    fn storage_error_displays_correctly() {
        let err = WidgetError::Storage(StorageError::Read("quota exceeded".into()));
        assert!(err.to_string().contains("read failed"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let widget_err: WidgetError = anyhow_err.into();
        assert!(widget_err.to_string().contains("something went wrong"));
    }
}
