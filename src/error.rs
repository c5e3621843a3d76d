//! Error types for the certificate admission hook
//!
//! None of these ever escape a decision call: the pipeline folds every failure
//! into an [`AdmissionDecision`](crate::webhooks::AdmissionDecision). They surface
//! only from construction, initialization and the remote access review.

use std::time::Duration;

use thiserror::Error;

/// Error variants are named with the `Error` suffix where they wrap another error type.
#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Access review timed out after {0:?}")]
    ReviewTimeout(Duration),

    #[error("Access review returned no status: {0}")]
    ReviewIncomplete(String),
}

impl Error {
    /// Whether this error came from the remote authorization service
    pub fn is_remote_review_failure(&self) -> bool {
        matches!(
            self,
            Error::KubeError(_) | Error::ReviewTimeout(_) | Error::ReviewIncomplete(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
