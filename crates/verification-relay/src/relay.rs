//! The verification event relay.

use crate::attempt::AttemptPhase;
use crate::config::RelayConfig;
use crate::continuation::ActivityContinuation;
use crate::error::RelayError;
use crate::event::{AttemptId, VerificationEvent, VerificationOutcome};
use crate::sdk::{AuthorizationRequest, VerifierSdk};
use chrono::{DateTime, Utc};
use profile_client::pkce::{self, CodeVerifier};
use secrecy::SecretString;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

/// Stream of events delivered to the active subscriber.
pub type EventStream = UnboundedReceiverStream<VerificationEvent>;

/// Handle identifying one subscription. Unsubscribing with a handle that has
/// been superseded is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle(u64);

/// An active subscription: the handle plus the event stream it owns.
pub struct Subscription {
    pub handle: SubscriptionHandle,
    pub events: EventStream,
}

/// Diagnostic snapshot of the in-flight attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptInfo {
    pub id: AttemptId,
    pub phase: AttemptPhase,
    pub started_at: DateTime<Utc>,
}

struct Listener {
    id: u64,
    tx: mpsc::UnboundedSender<VerificationEvent>,
}

struct Attempt {
    id: AttemptId,
    phase: AttemptPhase,
    started_at: DateTime<Utc>,
    app_link: Option<String>,
    code_verifier: CodeVerifier,
    /// Continuation fingerprint -> whether the SDK recognized it.
    continuations: HashMap<String, bool>,
}

#[derive(Default)]
struct RelayInner {
    listener: Option<Listener>,
    /// Depth-1 buffer: the single most recent event that arrived while no
    /// listener was registered.
    pending: Option<VerificationEvent>,
    attempt: Option<Attempt>,
    next_listener_id: u64,
    next_attempt_id: u64,
    /// Monotonic arrival-order clock stamped onto events.
    clock: u64,
}

fn lock_inner(inner: &Mutex<RelayInner>) -> MutexGuard<'_, RelayInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single point of translation and fan-out between the opaque SDK delegate
/// surface and the application's event subscription.
///
/// Guarantees: exactly-once delivery per SDK callback, in arrival order; at
/// most one terminal event per attempt; events for superseded attempts are
/// dropped. While no listener is registered, only the single most recent
/// event is buffered.
pub struct VerificationRelay {
    sdk: Arc<dyn VerifierSdk>,
    inner: Arc<Mutex<RelayInner>>,
}

impl VerificationRelay {
    pub fn new(sdk: Arc<dyn VerifierSdk>) -> Self {
        Self {
            sdk,
            inner: Arc::new(Mutex::new(RelayInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RelayInner> {
        lock_inner(&self.inner)
    }

    /// Begin a verification attempt.
    ///
    /// Returns synchronously only for configuration errors or an unusable
    /// SDK; every later outcome, including the SDK failing to open, arrives
    /// as an event. A second call supersedes the attempt in flight: events
    /// still tagged to it are dropped from then on.
    pub async fn start_verification(&self, config: &RelayConfig) -> Result<AttemptId, RelayError> {
        config.validate()?;
        if !self.sdk.is_usable() {
            return Err(RelayError::SdkUnavailable(
                "verification flow is not usable on this device".into(),
            ));
        }

        let verifier = CodeVerifier::generate();
        let request = AuthorizationRequest {
            client_id: config.client_id.clone(),
            scopes: config.scopes.clone(),
            state: pkce::generate_state(),
            code_challenge: verifier.code_challenge(),
            locale: config.locale.clone(),
            ui: config.ui.clone(),
        };

        let attempt_id = {
            let mut inner = self.lock();
            if let Some(prev) = &inner.attempt {
                if !prev.phase.is_terminal() {
                    info!(
                        superseded = prev.id.value(),
                        "New verification attempt supersedes one in flight"
                    );
                }
            }
            inner.next_attempt_id += 1;
            let id = AttemptId::new(inner.next_attempt_id);
            inner.attempt = Some(Attempt {
                id,
                phase: AttemptPhase::Started,
                started_at: Utc::now(),
                app_link: config.app_link.clone(),
                code_verifier: verifier,
                continuations: HashMap::new(),
            });
            // Anything buffered belongs to a superseded attempt now.
            inner.pending = None;
            id
        };

        info!(attempt = attempt_id.value(), "Starting verification attempt");
        let delegate = SdkDelegate {
            attempt: attempt_id,
            inner: Arc::clone(&self.inner),
        };
        if let Err(e) = self.sdk.begin_verification(request, delegate.clone()).await {
            warn!(error = %e, "SDK could not start the verification flow");
            delegate.on_failure("SDK_START_FAILED", e.to_string());
        }
        Ok(attempt_id)
    }

    /// Register the single active listener, replacing any previous one. A
    /// buffered pending event is flushed to the new listener before anything
    /// else.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        inner.next_listener_id += 1;
        let handle = SubscriptionHandle(inner.next_listener_id);
        if inner.listener.is_some() {
            debug!("Replacing active event listener");
        }
        if let Some(event) = inner.pending.take() {
            debug!(
                timestamp = event.timestamp,
                "Flushing buffered event to new listener"
            );
            // Receiver is still in scope, the send cannot fail.
            let _ = tx.send(event);
        }
        inner.listener = Some(Listener { id: handle.0, tx });
        Subscription {
            handle,
            events: UnboundedReceiverStream::new(rx),
        }
    }

    /// Clear the registration if `handle` is the active one; stale handles
    /// are ignored.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut inner = self.lock();
        match &inner.listener {
            Some(listener) if listener.id == handle.0 => {
                inner.listener = None;
                debug!("Listener unsubscribed");
            }
            _ => debug!("Ignoring unsubscribe with stale handle"),
        }
    }

    /// Hand an OS-delivered continuation to the relay. Returns `true` if it
    /// was recognized and consumed; duplicate deliveries of the same payload
    /// are answered without a second resolution action.
    pub async fn handle_activity_continuation(
        &self,
        continuation: &ActivityContinuation,
    ) -> bool {
        let fingerprint = continuation.fingerprint();
        {
            let mut inner = self.lock();
            let Some(attempt) = inner.attempt.as_mut() else {
                debug!("Dropping activity continuation: no attempt in flight");
                return false;
            };
            if attempt.phase.is_terminal() {
                debug!("Dropping stale activity continuation for resolved attempt");
                return false;
            }
            if let Some(link) = &attempt.app_link {
                if !continuation.url.starts_with(link.as_str()) {
                    debug!("Activity continuation outside configured app link");
                    return false;
                }
            }
            match attempt.continuations.get(&fingerprint) {
                Some(&recognized) => {
                    debug!("Duplicate activity continuation ignored");
                    return recognized;
                }
                None => {
                    // Reserve before the await: a concurrent duplicate must
                    // see the entry and take the idempotent path.
                    attempt.continuations.insert(fingerprint.clone(), true);
                }
            }
        }

        match self.sdk.resolve_continuation(&continuation.url).await {
            Ok(recognized) => {
                if !recognized {
                    debug!("SDK did not recognize the continuation URL");
                }
                let mut inner = self.lock();
                if let Some(attempt) = inner.attempt.as_mut() {
                    if let Some(entry) = attempt.continuations.get_mut(&fingerprint) {
                        *entry = recognized;
                    }
                }
                recognized
            }
            Err(e) => {
                warn!(error = %e, "SDK failed to resolve continuation");
                let mut inner = self.lock();
                if let Some(attempt) = inner.attempt.as_mut() {
                    attempt.continuations.remove(&fingerprint);
                }
                false
            }
        }
    }

    /// Snapshot of the in-flight attempt, if any.
    pub fn current_attempt(&self) -> Option<AttemptInfo> {
        self.lock().attempt.as_ref().map(|attempt| AttemptInfo {
            id: attempt.id,
            phase: attempt.phase,
            started_at: attempt.started_at,
        })
    }

    /// PKCE code verifier of the current attempt, for completing the token
    /// exchange after a `success` event.
    pub fn code_verifier(&self) -> Option<SecretString> {
        self.lock()
            .attempt
            .as_ref()
            .map(|attempt| attempt.code_verifier.clone().into_secret())
    }
}

/// Callback surface handed to the SDK for one attempt.
///
/// Cheap to clone; each clone stays tagged to the attempt it was created
/// for, so late callbacks from a superseded attempt fall through harmlessly.
#[derive(Clone)]
pub struct SdkDelegate {
    attempt: AttemptId,
    inner: Arc<Mutex<RelayInner>>,
}

impl SdkDelegate {
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn on_success(&self, profile_token: impl Into<String>) {
        self.deliver(VerificationOutcome::Success {
            profile_token: profile_token.into(),
        });
    }

    pub fn on_failure(&self, error_code: impl Into<String>, error_message: impl Into<String>) {
        self.deliver(VerificationOutcome::Failure {
            error_code: error_code.into(),
            error_message: error_message.into(),
        });
    }

    pub fn on_verification_required(&self) {
        self.deliver(VerificationOutcome::VerificationRequired);
    }

    pub fn on_dismissed(&self) {
        self.deliver(VerificationOutcome::Dismissed);
    }

    fn deliver(&self, outcome: VerificationOutcome) {
        let mut guard = lock_inner(&self.inner);
        let inner = &mut *guard;

        let Some(attempt) = inner.attempt.as_mut() else {
            debug!("Dropping SDK event: no attempt in flight");
            return;
        };
        if attempt.id != self.attempt {
            debug!(
                stale = self.attempt.value(),
                current = attempt.id.value(),
                "Dropping SDK event for superseded attempt"
            );
            return;
        }
        let kind = outcome.kind();
        if !attempt.phase.accept(kind) {
            debug!(?kind, "Dropping SDK event after terminal state");
            return;
        }

        inner.clock += 1;
        let event = outcome.into_event(inner.clock);
        match &inner.listener {
            Some(listener) => {
                if listener.tx.send(event.clone()).is_err() {
                    // Receiver was dropped without unsubscribing.
                    debug!("Listener channel closed; buffering event");
                    inner.listener = None;
                    inner.pending = Some(event);
                }
            }
            None => {
                if inner.pending.is_some() {
                    debug!("Overwriting buffered event with a newer one");
                }
                inner.pending = Some(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::sdk::{MockVerifierSdk, SdkError};
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_start_fails_when_sdk_unusable() {
        let mut sdk = MockVerifierSdk::new();
        sdk.expect_is_usable().return_const(false);

        let relay = VerificationRelay::new(Arc::new(sdk));
        let result = relay.start_verification(&RelayConfig::new("client-1")).await;

        assert!(matches!(result, Err(RelayError::SdkUnavailable(_))));
        assert!(relay.current_attempt().is_none());
    }

    #[tokio::test]
    async fn test_begin_error_surfaces_as_failure_event() {
        let mut sdk = MockVerifierSdk::new();
        sdk.expect_is_usable().return_const(true);
        sdk.expect_begin_verification()
            .returning(|_, _| Err(SdkError::Internal("native init failed".into())));

        let relay = VerificationRelay::new(Arc::new(sdk));
        let mut subscription = relay.subscribe();
        relay
            .start_verification(&RelayConfig::new("client-1"))
            .await
            .unwrap();

        let event = subscription.events.next().await.unwrap();
        assert_eq!(event.kind, EventKind::Failure);
        assert_eq!(event.error_code.as_deref(), Some("SDK_START_FAILED"));
        assert!(event
            .error_message
            .as_deref()
            .unwrap()
            .contains("native init failed"));
        assert!(relay.current_attempt().unwrap().phase.is_terminal());
    }

    #[tokio::test]
    async fn test_duplicate_continuation_resolved_once() {
        let mut sdk = MockVerifierSdk::new();
        sdk.expect_is_usable().return_const(true);
        sdk.expect_begin_verification().returning(|_, _| Ok(()));
        sdk.expect_resolve_continuation()
            .times(1)
            .returning(|_| Ok(true));

        let relay = VerificationRelay::new(Arc::new(sdk));
        relay
            .start_verification(&RelayConfig::new("client-1"))
            .await
            .unwrap();

        let continuation = ActivityContinuation::new("https://app.example/verify?code=1");
        assert!(relay.handle_activity_continuation(&continuation).await);
        // Same payload again: answered without a second SDK call.
        assert!(relay.handle_activity_continuation(&continuation).await);
    }

    #[tokio::test]
    async fn test_unrecognized_continuation_answer_is_remembered() {
        let mut sdk = MockVerifierSdk::new();
        sdk.expect_is_usable().return_const(true);
        sdk.expect_begin_verification().returning(|_, _| Ok(()));
        sdk.expect_resolve_continuation()
            .times(1)
            .returning(|_| Ok(false));

        let relay = VerificationRelay::new(Arc::new(sdk));
        relay
            .start_verification(&RelayConfig::new("client-1"))
            .await
            .unwrap();

        let continuation = ActivityContinuation::new("https://elsewhere.example/x");
        assert!(!relay.handle_activity_continuation(&continuation).await);
        assert!(!relay.handle_activity_continuation(&continuation).await);
    }

    #[tokio::test]
    async fn test_continuation_outside_app_link_rejected() {
        let mut sdk = MockVerifierSdk::new();
        sdk.expect_is_usable().return_const(true);
        sdk.expect_begin_verification().returning(|_, _| Ok(()));
        // No resolve_continuation expectation: the SDK must not be called.

        let relay = VerificationRelay::new(Arc::new(sdk));
        let mut config = RelayConfig::new("client-1");
        config.app_link = Some("https://app.example/auth".into());
        relay.start_verification(&config).await.unwrap();

        let foreign = ActivityContinuation::new("https://other.example/auth?x=1");
        assert!(!relay.handle_activity_continuation(&foreign).await);
    }

    #[tokio::test]
    async fn test_code_verifier_tracks_current_attempt() {
        use secrecy::ExposeSecret;

        let mut sdk = MockVerifierSdk::new();
        sdk.expect_is_usable().return_const(true);
        sdk.expect_begin_verification().returning(|_, _| Ok(()));

        let relay = VerificationRelay::new(Arc::new(sdk));
        assert!(relay.code_verifier().is_none());

        let config = RelayConfig::new("client-1");
        relay.start_verification(&config).await.unwrap();
        let first = relay.code_verifier().unwrap();

        relay.start_verification(&config).await.unwrap();
        let second = relay.code_verifier().unwrap();

        assert_ne!(first.expose_secret(), second.expose_secret());
    }
}
