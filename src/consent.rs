//! ConsentOracle: "has the user opted in to non-essential UI?"
//!
//! The answer is re-derived from the live page on every call. The document
//! flag wins when set; otherwise the persisted record decides; anything
//! unreadable or malformed means no.

use crate::page::ConsentSource;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ConsentRecord {
    #[serde(rename = "hasConsented", default)]
    has_consented: bool,
}

/// Resolve the current consent state. Never errors: storage failures and
/// malformed records degrade to `false`.
pub fn has_consent(source: &dyn ConsentSource) -> bool {
    if source.consent_flag() {
        return true;
    }

    let raw = match source.stored_consent() {
        Ok(Some(raw)) => raw,
        Ok(None) => return false,
        Err(e) => {
            tracing::warn!("consent record read failed: {e:#}");
            return false;
        }
    };

    match serde_json::from_str::<ConsentRecord>(&raw) {
        Ok(record) => record.has_consented,
        Err(e) => {
            tracing::warn!("consent record malformed: {e}");
            false
        }
    }
}
