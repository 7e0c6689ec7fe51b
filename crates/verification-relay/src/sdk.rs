//! Upstream SDK surface consumed by the relay.

use crate::config::UiOptions;
use crate::relay::SdkDelegate;
use async_trait::async_trait;
use thiserror::Error;

/// What the relay hands the SDK to start a verification flow.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub scopes: Vec<String>,
    /// OAuth state, fresh per attempt.
    pub state: String,
    /// PKCE S256 code challenge, fresh per attempt.
    pub code_challenge: String,
    pub locale: Option<String>,
    pub ui: UiOptions,
}

/// SDK-side errors.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("SDK unavailable: {0}")]
    Unavailable(String),

    #[error("SDK rejected the request: {code}: {message}")]
    Rejected { code: String, message: String },

    #[error("SDK internal error: {0}")]
    Internal(String),
}

/// Opaque native verification SDK.
///
/// The real implementation wraps the proprietary provider library; tests use
/// mocks. Outcomes never come back through these return values — the SDK
/// reports them later through the [`SdkDelegate`] it was given.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerifierSdk: Send + Sync {
    /// Whether the verification flow can run on this device at all.
    fn is_usable(&self) -> bool;

    /// Begin the consent/verification flow for one attempt.
    async fn begin_verification(
        &self,
        request: AuthorizationRequest,
        delegate: SdkDelegate,
    ) -> Result<(), SdkError>;

    /// Hand a recognized continuation URL into the SDK for resolution.
    /// Returns `Ok(false)` if the SDK does not recognize the URL.
    async fn resolve_continuation(&self, url: &str) -> Result<bool, SdkError>;
}
