//! ClusterIssuer access policy
//!
//! Certificates that reference a namespaced `Issuer` are always authorized.
//! Referencing a `ClusterIssuer` requires elevated trust, proven by either:
//! - being the designated administrator (`<identity provider URL>#<admin>`)
//! - membership in `system:masters` or the cert-manager service account group

use kube::ResourceExt;
use tracing::{debug, info, warn};

use super::AuthorizationOutcome;
use crate::config::AdmissionConfig;
use crate::crd::Certificate;
use crate::webhooks::identity::UserInfo;

/// Cluster administrators
pub const CLUSTER_ADMIN_GROUP: &str = "system:masters";
/// Service accounts of cert-manager itself
pub const CERT_MANAGER_SERVICE_ACCOUNT_GROUP: &str = "system:serviceaccounts:cert-manager";
/// Groups whose members may use any ClusterIssuer
pub const TRUSTED_GROUPS: [&str; 2] = [CLUSTER_ADMIN_GROUP, CERT_MANAGER_SERVICE_ACCOUNT_GROUP];

/// The one identity allowed to bypass group checks
#[derive(Clone, Debug, PartialEq, Eq)]
struct DesignatedAdmin {
    admin: String,
    username: String,
}

impl DesignatedAdmin {
    /// Both values must be present and non-blank once trimmed
    fn from_config(config: &AdmissionConfig) -> Option<Self> {
        let admin = config.default_admin.as_deref()?.trim();
        let base_url = config.identity_provider_url.as_deref()?.trim();
        if admin.is_empty() || base_url.is_empty() {
            return None;
        }
        Some(Self {
            admin: admin.to_string(),
            username: format!("{}#{}", base_url, admin),
        })
    }

    fn matches(&self, user: &UserInfo) -> bool {
        match user.username_fragment() {
            Some(fragment) => fragment == self.admin && user.username == self.username,
            None => false,
        }
    }
}

/// Decides whether a caller may reference the issuer of a Certificate
#[derive(Clone, Debug, Default)]
pub struct IssuerAccessPolicy {
    designated_admin: Option<DesignatedAdmin>,
}

impl IssuerAccessPolicy {
    pub fn new(config: &AdmissionConfig) -> Self {
        let designated_admin = DesignatedAdmin::from_config(config);
        if designated_admin.is_none() {
            debug!(
                "Designated admin or identity provider URL not configured, admin override disabled"
            );
        }
        Self { designated_admin }
    }

    /// Whether the designated admin override can ever succeed
    pub fn override_enabled(&self) -> bool {
        self.designated_admin.is_some()
    }

    /// Whether `user` is exactly the configured designated administrator
    pub fn is_designated_admin(&self, user: &UserInfo) -> bool {
        self.designated_admin
            .as_ref()
            .is_some_and(|admin| admin.matches(user))
    }

    /// Whether `user` belongs to one of the trusted groups
    pub fn in_trusted_group(user: &UserInfo) -> bool {
        TRUSTED_GROUPS.iter().any(|group| user.in_group(group))
    }

    /// Authorize `user` to create `certificate`
    pub fn authorize(&self, user: &UserInfo, certificate: &Certificate) -> AuthorizationOutcome {
        let issuer = &certificate.spec.issuer_ref;
        if !issuer.is_cluster_scoped() {
            return AuthorizationOutcome::allowed();
        }

        if self.is_designated_admin(user) {
            info!(
                user = %user.username,
                certificate = %certificate.name_any(),
                issuer = %issuer.name,
                "Designated admin authorized to use ClusterIssuer"
            );
            return AuthorizationOutcome::allowed();
        }

        if Self::in_trusted_group(user) {
            debug!(
                user = %user.username,
                issuer = %issuer.name,
                "Trusted group member authorized to use ClusterIssuer"
            );
            return AuthorizationOutcome::allowed();
        }

        warn!(
            user = %user.username,
            certificate = %certificate.name_any(),
            issuer = %issuer.name,
            "[UNAUTHORIZED] user is not a cluster administrator and tried to use a ClusterIssuer"
        );
        AuthorizationOutcome::denied(&denial_message(certificate))
    }
}

/// Message returned to a caller denied use of a ClusterIssuer
pub fn denial_message(certificate: &Certificate) -> String {
    format!(
        "User is unauthorized to create the Certificate {} using the ClusterIssuer {}.",
        certificate.name_any(),
        certificate.spec.issuer_ref.name
    )
}
