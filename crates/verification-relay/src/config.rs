//! Relay configuration.

use crate::error::RelayError;
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Configuration for one verification flow.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// OAuth client id issued by the verification provider.
    pub client_id: String,

    /// Provider app key, where the platform SDK requires one.
    #[serde(default)]
    pub app_key: Option<SecretString>,

    /// Deep-link prefix registered for this app. Continuations whose URL
    /// falls outside this prefix are not recognized.
    #[serde(default)]
    pub app_link: Option<String>,

    /// BCP 47 language tag for the consent screen.
    #[serde(default)]
    pub locale: Option<String>,

    /// OAuth scopes requested from the provider.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Consent screen customization.
    #[serde(default)]
    pub ui: UiOptions,
}

impl RelayConfig {
    /// Create a configuration with provider defaults for everything but the
    /// client id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            app_key: None,
            app_link: None,
            locale: None,
            scopes: default_scopes(),
            ui: UiOptions::default(),
        }
    }

    /// Load configuration from environment variables (`RELAY__…`).
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.client_id.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "client_id must not be empty".into(),
            ));
        }
        if self.app_key.is_some() && self.app_link.is_none() {
            return Err(RelayError::InvalidConfig(
                "app_key requires a matching app_link".into(),
            ));
        }
        Ok(())
    }
}

fn default_scopes() -> Vec<String> {
    vec!["profile".into(), "phone".into(), "email".into()]
}

/// Consent screen customization handed through to the SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiOptions {
    /// Button fill color, e.g. `#0087FF`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,

    /// Button label color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text_color: Option<String>,

    #[serde(default)]
    pub button_text: ButtonText,

    #[serde(default)]
    pub button_shape: ButtonShape,

    #[serde(default)]
    pub footer_text: FooterText,

    #[serde(default)]
    pub consent_heading: ConsentHeading,
}

/// Call-to-action label on the consent button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonText {
    #[default]
    Continue,
    Accept,
    Confirm,
    Proceed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonShape {
    #[default]
    Rounded,
    Rectangle,
}

/// Fallback action offered below the consent button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterText {
    #[default]
    Skip,
    AnotherMobileNumber,
    AnotherMethod,
    Manually,
    Later,
}

/// Heading shown on the consent screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentHeading {
    #[default]
    LogInTo,
    SignUpWith,
    SignInTo,
    VerifyNumberWith,
    RegisterWith,
    GetStartedWith,
    ProceedWith,
    VerifyWith,
    VerifyProfileWith,
    VerifyYourProfileWith,
    VerifyPhoneNumberWith,
    VerifyYourNumberWith,
    ContinueWith,
    CompleteOrderWith,
    PlaceOrderWith,
    CompleteBookingWith,
    CheckoutWith,
    ManageDetailsWith,
    ManageYourDetailsWith,
    LoginToWithOneTap,
    SubscribeTo,
    GetUpdatesFrom,
    ContinueReadingOn,
    GetNewUpdatesFrom,
    LoginSignupWith,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_provider_defaults() {
        let config = RelayConfig::new("client-1");
        assert_eq!(config.scopes, vec!["profile", "phone", "email"]);
        assert_eq!(config.ui.button_text, ButtonText::Continue);
        assert_eq!(config.ui.consent_heading, ConsentHeading::LogInTo);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_client_id() {
        let config = RelayConfig::new("  ");
        assert!(matches!(
            config.validate(),
            Err(RelayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_requires_app_link_with_app_key() {
        let mut config = RelayConfig::new("client-1");
        config.app_key = Some(SecretString::new("key".into()));
        assert!(config.validate().is_err());

        config.app_link = Some("https://app.example/auth".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ui_options_deserialize() {
        let json = serde_json::json!({
            "button_color": "#0087FF",
            "button_text": "confirm",
            "button_shape": "rectangle",
            "footer_text": "another_method",
            "consent_heading": "verify_number_with"
        });

        let ui: UiOptions = serde_json::from_value(json).unwrap();
        assert_eq!(ui.button_text, ButtonText::Confirm);
        assert_eq!(ui.button_shape, ButtonShape::Rectangle);
        assert_eq!(ui.footer_text, FooterText::AnotherMethod);
        assert_eq!(ui.consent_heading, ConsentHeading::VerifyNumberWith);
        assert!(ui.button_text_color.is_none());
    }

    #[test]
    fn test_debug_redacts_app_key() {
        let mut config = RelayConfig::new("client-1");
        config.app_key = Some(SecretString::new("super-secret".into()));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
    }
}
