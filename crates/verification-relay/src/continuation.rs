//! OS-level activity continuation payloads (deep links / hand-off).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A deep-link or hand-off payload delivered by the host OS while a
/// verification attempt is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityContinuation {
    /// Opaque continuation URL.
    pub url: String,

    /// Opaque restoration handle from the OS, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restoration_context: Option<String>,
}

impl ActivityContinuation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            restoration_context: None,
        }
    }

    pub fn with_context(url: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            restoration_context: Some(context.into()),
        }
    }

    /// SHA-256 fingerprint identifying this payload. Duplicate deliveries of
    /// the same payload hash to the same fingerprint and are resolved at
    /// most once.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());
        hasher.update([0u8]);
        if let Some(context) = &self.restoration_context {
            hasher.update(context.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
