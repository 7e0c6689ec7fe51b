//! Profile client configuration.

use serde::Deserialize;
use std::time::Duration;

/// Endpoint and timeout configuration for [`crate::ProfileClient`].
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileClientConfig {
    /// OAuth token endpoint URL
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// User-info endpoint URL
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,

    /// HTTP request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ProfileClientConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            userinfo_url: default_userinfo_url(),
            timeout: default_timeout(),
        }
    }
}

fn default_token_url() -> String {
    "https://oauth-account-noneu.truecaller.com/v1/token".into()
}

fn default_userinfo_url() -> String {
    "https://oauth-account-noneu.truecaller.com/v1/userinfo".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
