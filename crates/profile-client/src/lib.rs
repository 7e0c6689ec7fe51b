//! OAuth profile client for the phone-verification provider.
//!
//! After a verification attempt succeeds, the host application holds an
//! authorization code and the attempt's PKCE code verifier. This crate
//! completes the flow:
//! - Exchange the code for an access token (form-encoded PKCE grant)
//! - Fetch the verified user profile from the user-info endpoint

pub mod config;
pub mod pkce;

mod client;
mod error;
mod types;

pub use client::ProfileClient;
pub use config::ProfileClientConfig;
pub use error::ProfileError;
pub use pkce::CodeVerifier;
pub use types::{TokenResponse, UserInfoClaims, UserProfile};

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> ProfileClient {
        let config = ProfileClientConfig {
            token_url: format!("{}/v1/token", mock_server.uri()),
            userinfo_url: format!("{}/v1/userinfo", mock_server.uri()),
            ..Default::default()
        };
        ProfileClient::new(config).unwrap()
    }

    fn test_verifier() -> CodeVerifier {
        CodeVerifier::from_secret(SecretString::new("test-code-verifier-0123456789".into()))
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code-123"))
            .and(body_string_contains("code_verifier=test-code-verifier-0123456789"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-456",
                "token_type": "Bearer",
                "expires_in": 3600,
                "scope": "profile phone email"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let token = client
            .exchange_code("client-1", "auth-code-123", &test_verifier())
            .await
            .unwrap();

        assert_eq!(token.access_token, "at-456");
        assert_eq!(token.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn test_exchange_code_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .exchange_code("client-1", "expired-code", &test_verifier())
            .await;

        assert!(matches!(result, Err(ProfileError::TokenExchange(_))));
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/userinfo"))
            .and(header("Authorization", "Bearer at-456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "given_name": "Priya",
                "family_name": "Sharma",
                "phone_number": "+919876543210",
                "phone_number_country_code": "IN",
                "gender": null,
                "email": "priya@example.com"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let profile = client.fetch_profile("at-456").await.unwrap();

        assert_eq!(profile.first_name, "Priya");
        assert_eq!(profile.phone_number, "+919876543210");
        assert_eq!(profile.country_code, "IN");
        assert_eq!(profile.email, Some("priya@example.com".into()));
    }

    #[tokio::test]
    async fn test_fetch_profile_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/userinfo"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired token"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.fetch_profile("stale-token").await;

        assert!(matches!(result, Err(ProfileError::UserInfo(_))));
    }

    #[tokio::test]
    async fn test_verify_profile_end_to_end() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-789",
                "token_type": "Bearer",
                "expires_in": 3600,
                "scope": null
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/userinfo"))
            .and(header("Authorization", "Bearer at-789"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "given_name": "Arjun",
                "family_name": null,
                "phone_number": "+14155551234",
                "phone_number_country_code": "US",
                "gender": null,
                "email": null
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let profile = client
            .verify_profile("client-1", "auth-code", &test_verifier())
            .await
            .unwrap();

        assert_eq!(profile.first_name, "Arjun");
        assert!(profile.last_name.is_none());
    }
}
