use crate::error::ConfigError;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ─── Widget configuration ───────────────────────────────────────────────────

/// All timing and geometry constants for the widget, grouped per subsystem.
///
/// Every field has a serde default matching the shipped site behavior, so an
/// empty TOML file (or no file at all) yields a working configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub animation: AnimationConfig,

    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    #[serde(default)]
    pub geometry: GeometryConfig,
}

// ─── Readiness wait ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Poll-path interval while waiting for the preload phase to finish.
    pub poll_interval_ms: u64,
    /// Upper bound on the wait; past this the widget proceeds anyway.
    pub max_wait_ms: u64,
    /// Settle delay applied after a successful readiness signal, so any
    /// concurrent DOM work finishes before the widget touches the page.
    pub safety_delay_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            max_wait_ms: 10_000,
            safety_delay_ms: 500,
        }
    }
}

// ─── Entrance animation / caption ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Delay before the entrance class is added after the button is revealed.
    pub entrance_class_delay_ms: u64,
    /// Delay before the first position recompute of a fresh activation.
    pub entrance_position_delay_ms: u64,
    /// Delay before the caption auto-hide sequence is scheduled.
    pub caption_sequence_delay_ms: u64,
    /// Caption auto-hide: time until the fade class is added.
    pub caption_fade_delay_ms: u64,
    /// Caption auto-hide: additional time until the caption is fully removed.
    pub caption_gone_delay_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            entrance_class_delay_ms: 100,
            entrance_position_delay_ms: 200,
            caption_sequence_delay_ms: 300,
            caption_fade_delay_ms: 1_000,
            caption_gone_delay_ms: 500,
        }
    }
}

// ─── Heartbeat pulse ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    pub enabled: bool,
    /// Period between attention pulses. Must dwarf the pulse itself so two
    /// pulses never overlap.
    pub interval_ms: u64,
    /// Pulse shape: remove the emphasis class, re-add it after this delay…
    pub pulse_add_delay_ms: u64,
    /// …and remove it again this long after the re-add.
    pub pulse_remove_delay_ms: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 10_000,
            pulse_add_delay_ms: 100,
            pulse_remove_delay_ms: 1_200,
        }
    }
}

// ─── Placement geometry ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Fixed inset from the right viewport edge.
    pub right_inset_px: f64,
    /// Default inset from the bottom edge when the footer is out of view.
    pub bottom_inset_px: f64,
    /// Approximate rendered footprint of the button, used to keep it clear
    /// of the footer.
    pub widget_height_px: f64,
    /// The button never rises above this distance from the viewport top.
    pub min_top_px: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            right_inset_px: 25.0,
            bottom_inset_px: 35.0,
            widget_height_px: 80.0,
            min_top_px: 20.0,
        }
    }
}

// ─── Loading & validation ───────────────────────────────────────────────────

impl WidgetConfig {
    /// Parse a config from TOML. Missing sections fall back to defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Load(e.to_string()))?;
        Ok(config)
    }

    /// Load and validate a config file from disk.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the timers cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.readiness.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "readiness.poll_interval_ms must be positive".into(),
            ));
        }
        if self.readiness.max_wait_ms < self.readiness.poll_interval_ms {
            return Err(ConfigError::Validation(
                "readiness.max_wait_ms must cover at least one poll interval".into(),
            ));
        }
        if self.heartbeat.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "heartbeat.interval_ms must be positive".into(),
            ));
        }
        let pulse_ms = self.heartbeat.pulse_add_delay_ms + self.heartbeat.pulse_remove_delay_ms;
        if self.heartbeat.enabled && self.heartbeat.interval_ms <= pulse_ms {
            return Err(ConfigError::Validation(format!(
                "heartbeat.interval_ms ({}) must exceed the pulse duration ({pulse_ms})",
                self.heartbeat.interval_ms
            )));
        }
        if self.geometry.widget_height_px <= 0.0 {
            return Err(ConfigError::Validation(
                "geometry.widget_height_px must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.readiness.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.readiness.max_wait_ms)
    }

    pub fn safety_delay(&self) -> Duration {
        Duration::from_millis(self.readiness.safety_delay_ms)
    }
}

// ─── Live config handle ─────────────────────────────────────────────────────

/// Live-reloadable configuration holder.
///
/// Wraps `WidgetConfig` in an `ArcSwap` so readers never block and writers
/// atomically swap the pointer. Background cycles snapshot the config when
/// they start, so a reload takes effect from the next cycle on.
pub struct ConfigHandle {
    inner: Arc<ArcSwap<WidgetConfig>>,
    path: Option<PathBuf>,
}

impl ConfigHandle {
    /// Create a new handle seeded with `config`.
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
            path: None,
        }
    }

    /// Create a handle backed by a config file, enabling [`ConfigHandle::reload`].
    pub fn from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = WidgetConfig::load_from_path(&path)?;
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
            path: Some(path),
        })
    }

    /// Load current config snapshot. Lock-free.
    pub fn load(&self) -> arc_swap::Guard<Arc<WidgetConfig>> {
        self.inner.load()
    }

    /// Return a clone of the current `Arc<WidgetConfig>`.
    pub fn load_full(&self) -> Arc<WidgetConfig> {
        self.inner.load_full()
    }

    /// Reload config from disk, atomically swapping the active snapshot.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            return Err(ConfigError::Load(
                "config handle has no backing file".into(),
            ));
        };
        let fresh = WidgetConfig::load_from_path(path)?;
        self.inner.store(Arc::new(fresh));
        tracing::info!(path = %path.display(), "widget config hot-reloaded");
        Ok(())
    }

    /// Manually swap in a new config (e.g. after programmatic mutation).
    pub fn store(&self, config: WidgetConfig) {
        self.inner.store(Arc::new(config));
    }
}

impl Clone for ConfigHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            path: self.path.clone(),
        }
    }
}
