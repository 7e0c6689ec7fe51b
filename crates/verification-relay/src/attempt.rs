//! Per-attempt state machine.

use crate::event::EventKind;
use serde::Serialize;

/// Phase of a verification attempt.
///
/// `Started -> AwaitingUserAction -> Terminal`, where `AwaitingUserAction`
/// is optional and any terminal kind is absorbing: once terminal, no further
/// events are accepted for the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttemptPhase {
    Started,
    AwaitingUserAction,
    Terminal(EventKind),
}

impl AttemptPhase {
    /// Record an arriving event kind. Returns `false` if the event must be
    /// dropped because the attempt already reached a terminal state.
    pub fn accept(&mut self, kind: EventKind) -> bool {
        if self.is_terminal() {
            return false;
        }
        *self = if kind.is_terminal() {
            AttemptPhase::Terminal(kind)
        } else {
            AttemptPhase::AwaitingUserAction
        };
        true
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptPhase::Terminal(_))
    }
}
