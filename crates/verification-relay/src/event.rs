//! Verification events in the shape delivered to application code.

use serde::{Deserialize, Serialize};

/// Identifier of one verification attempt.
///
/// Monotonically increasing; events tagged with a superseded id are dropped
/// by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(u64);

impl AttemptId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Success,
    Failure,
    VerificationRequired,
    Dismissed,
}

impl EventKind {
    /// Whether this kind ends an attempt. `verificationRequired` is the only
    /// non-terminal kind.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventKind::VerificationRequired)
    }
}

/// Outcome of an SDK callback, before an arrival timestamp is assigned.
#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    Success {
        profile_token: String,
    },
    Failure {
        error_code: String,
        error_message: String,
    },
    VerificationRequired,
    Dismissed,
}

impl VerificationOutcome {
    pub fn kind(&self) -> EventKind {
        match self {
            VerificationOutcome::Success { .. } => EventKind::Success,
            VerificationOutcome::Failure { .. } => EventKind::Failure,
            VerificationOutcome::VerificationRequired => EventKind::VerificationRequired,
            VerificationOutcome::Dismissed => EventKind::Dismissed,
        }
    }

    pub(crate) fn into_event(self, timestamp: u64) -> VerificationEvent {
        let kind = self.kind();
        let (profile_token, error_code, error_message) = match self {
            VerificationOutcome::Success { profile_token } => (Some(profile_token), None, None),
            VerificationOutcome::Failure {
                error_code,
                error_message,
            } => (None, Some(error_code), Some(error_message)),
            VerificationOutcome::VerificationRequired | VerificationOutcome::Dismissed => {
                (None, None, None)
            }
        };
        VerificationEvent {
            kind,
            profile_token,
            error_code,
            error_message,
            timestamp,
        }
    }
}

/// One verification event as delivered to the subscriber.
///
/// The wire shape is stable across platforms:
/// `{ kind, profileToken?, errorCode?, errorMessage?, timestamp }`.
/// `timestamp` is a monotonic arrival-order marker, not wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationEvent {
    pub kind: EventKind,

    /// Present only on `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_token: Option<String>,

    /// Present only on `failure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Present only on `failure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub timestamp: u64,
}
