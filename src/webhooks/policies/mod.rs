//! Admission authorization policies
//!
//! The issuer access policy decides whether a caller may reference the issuer
//! named by a Certificate. Its outcome is computed once per request.

pub mod issuer_access;

pub use issuer_access::{
    CERT_MANAGER_SERVICE_ACCOUNT_GROUP, CLUSTER_ADMIN_GROUP, IssuerAccessPolicy,
    TRUSTED_GROUPS,
};

/// Result of an authorization policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationOutcome {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AuthorizationOutcome {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn denied(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}
