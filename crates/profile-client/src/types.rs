//! Wire types for the OAuth token and user-info endpoints.

use serde::{Deserialize, Serialize};

/// Response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

/// Raw claims returned by the provider's user-info endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoClaims {
    pub given_name: String,
    pub family_name: Option<String>,
    pub phone_number: String,
    pub phone_number_country_code: String,
    pub gender: Option<String>,
    pub email: Option<String>,
}

/// Verified user profile in the shape handed to application code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone_number: String,
    pub country_code: String,
    pub gender: Option<String>,
    pub email: Option<String>,
}

impl From<UserInfoClaims> for UserProfile {
    fn from(claims: UserInfoClaims) -> Self {
        Self {
            first_name: claims.given_name,
            last_name: claims.family_name,
            phone_number: claims.phone_number,
            country_code: claims.phone_number_country_code,
            gender: claims.gender,
            email: claims.email,
        }
    }
}
