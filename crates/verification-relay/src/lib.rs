//! Verification event relay.
//!
//! Bridges an opaque phone-verification SDK to a host application:
//! - Translates SDK delegate callbacks into a stable, serializable event
//!   shape and forwards them exactly once, in arrival order, to the single
//!   active subscriber
//! - Buffers the most recent event while no subscriber is registered
//! - Consumes OS-level activity continuations (deep links) at most once per
//!   distinct payload
//! - Drops late events from superseded attempts

pub mod attempt;
pub mod config;
pub mod continuation;
pub mod error;
pub mod event;
pub mod relay;
pub mod sdk;

pub use attempt::AttemptPhase;
pub use config::{ButtonShape, ButtonText, ConsentHeading, FooterText, RelayConfig, UiOptions};
pub use continuation::ActivityContinuation;
pub use error::RelayError;
pub use event::{AttemptId, EventKind, VerificationEvent, VerificationOutcome};
pub use relay::{
    AttemptInfo, EventStream, SdkDelegate, Subscription, SubscriptionHandle, VerificationRelay,
};
pub use sdk::{AuthorizationRequest, SdkError, VerifierSdk};
