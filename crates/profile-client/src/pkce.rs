//! PKCE code verifier/challenge and OAuth state generation (RFC 7636).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Length of generated code verifiers. RFC 7636 allows 43..=128.
const VERIFIER_LEN: usize = 64;

/// A PKCE code verifier.
///
/// Kept secret-wrapped: the verifier must only travel to the token endpoint,
/// never into logs or event payloads.
#[derive(Clone)]
pub struct CodeVerifier(SecretString);

impl CodeVerifier {
    /// Generate a fresh random code verifier.
    pub fn generate() -> Self {
        let verifier: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(VERIFIER_LEN)
            .map(char::from)
            .collect();
        Self(SecretString::new(verifier))
    }

    /// Reconstruct a verifier from a stored secret.
    pub fn from_secret(secret: SecretString) -> Self {
        Self(secret)
    }

    /// Derive the S256 code challenge: base64url(sha256(verifier)), no padding.
    pub fn code_challenge(&self) -> String {
        let digest = Sha256::digest(self.0.expose_secret().as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    /// Access the raw verifier for the token exchange request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// The verifier as a secret string, for handing off to callers.
    pub fn into_secret(self) -> SecretString {
        self.0
    }
}

impl std::fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CodeVerifier([REDACTED])")
    }
}

/// Generate a random OAuth state parameter (32 hex chars).
pub fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}
