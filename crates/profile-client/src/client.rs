//! HTTP client for the provider's OAuth token and user-info endpoints.

use crate::config::ProfileClientConfig;
use crate::error::ProfileError;
use crate::pkce::CodeVerifier;
use crate::types::*;
use reqwest::Client;
use tracing::{debug, instrument};

/// Client that turns a successful verification's authorization code into
/// a verified user profile.
#[derive(Clone)]
pub struct ProfileClient {
    client: Client,
    config: ProfileClientConfig,
}

impl ProfileClient {
    /// Create a new profile client.
    pub fn new(config: ProfileClientConfig) -> Result<Self, ProfileError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Exchange an authorization code for an access token (PKCE flow).
    #[instrument(skip(self, authorization_code, code_verifier))]
    pub async fn exchange_code(
        &self,
        client_id: &str,
        authorization_code: &str,
        code_verifier: &CodeVerifier,
    ) -> Result<TokenResponse, ProfileError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("code", authorization_code),
            ("code_verifier", code_verifier.expose()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProfileError::TokenExchange(format!(
                "{}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!("Token exchange succeeded");
        Ok(token)
    }

    /// Fetch the verified user profile with a bearer access token.
    #[instrument(skip(self, access_token))]
    pub async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, ProfileError> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProfileError::UserInfo(format!("{}: {}", status, body)));
        }

        let claims: UserInfoClaims = response.json().await?;
        Ok(UserProfile::from(claims))
    }

    /// Complete the post-verification flow: exchange the code, then fetch
    /// the profile with the resulting token.
    pub async fn verify_profile(
        &self,
        client_id: &str,
        authorization_code: &str,
        code_verifier: &CodeVerifier,
    ) -> Result<UserProfile, ProfileError> {
        let token = self
            .exchange_code(client_id, authorization_code, code_verifier)
            .await?;
        self.fetch_profile(&token.access_token).await
    }
}
