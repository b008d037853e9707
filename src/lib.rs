#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod consent;
pub mod coordinator;
pub mod error;
pub mod heartbeat;
pub mod manager;
pub mod page;
pub mod position;
pub mod readiness;
pub mod sequence;

pub use config::{ConfigHandle, WidgetConfig};
pub use coordinator::ActivationState;
pub use error::{Result, WidgetError};
pub use manager::{DebugReport, WidgetManager};
pub use page::MemoryPage;
