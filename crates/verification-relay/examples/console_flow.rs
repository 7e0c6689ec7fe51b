//! Demo of the relay against a scripted in-process SDK.
//! Run with: cargo run -p verification-relay --example console_flow

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use verification_relay::{
    AuthorizationRequest, RelayConfig, SdkDelegate, SdkError, VerificationRelay, VerifierSdk,
};

/// SDK stand-in that acts like a user who gets prompted and then consents.
struct ScriptedSdk;

#[async_trait]
impl VerifierSdk for ScriptedSdk {
    fn is_usable(&self) -> bool {
        true
    }

    async fn begin_verification(
        &self,
        request: AuthorizationRequest,
        delegate: SdkDelegate,
    ) -> Result<(), SdkError> {
        println!(
            "SDK: starting flow for client {} (scopes: {})",
            request.client_id,
            request.scopes.join(" ")
        );
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            delegate.on_verification_required();
            tokio::time::sleep(Duration::from_millis(200)).await;
            delegate.on_success("demo-authorization-code");
        });
        Ok(())
    }

    async fn resolve_continuation(&self, _url: &str) -> Result<bool, SdkError> {
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let client_id =
        std::env::var("RELAY__CLIENT_ID").unwrap_or_else(|_| "demo-client".to_string());

    let relay = VerificationRelay::new(Arc::new(ScriptedSdk));
    let mut subscription = relay.subscribe();

    let attempt = relay
        .start_verification(&RelayConfig::new(client_id))
        .await?;
    println!("Started attempt {}", attempt);

    while let Some(event) = subscription.events.next().await {
        println!("Event: {}", serde_json::to_string(&event)?);
        if event.kind.is_terminal() {
            break;
        }
    }

    Ok(())
}
