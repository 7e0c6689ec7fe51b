//! Relay errors.
//!
//! Only conditions that must surface synchronously live here. SDK-reported
//! verification failures travel as `failure` events, never as `Err` returns.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Verification SDK unavailable: {0}")]
    SdkUnavailable(String),

    #[error("Invalid relay configuration: {0}")]
    InvalidConfig(String),
}
