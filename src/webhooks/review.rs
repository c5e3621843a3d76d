//! Remote access review
//!
//! Asks the API server whether a caller may `use` a ClusterIssuer by posting a
//! `SubjectAccessReview`. Failures here never fail an admission decision; the
//! hook logs them and carries on with the local policy outcome.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SubjectAccessReview, SubjectAccessReviewSpec,
};
use kube::api::PostParams;
use kube::{Api, Client};
#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::crd::CERTMANAGER_GROUP;
use crate::error::{Error, Result};
use crate::webhooks::identity::UserInfo;

/// Verb checked for issuer access
pub const USE_VERB: &str = "use";
/// RBAC resource name of ClusterIssuers
pub const CLUSTER_ISSUERS_RESOURCE: &str = "clusterissuers";

/// Attributes of a single "can this user use this issuer" question
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessReviewRequest {
    pub namespace: Option<String>,
    pub issuer_name: String,
    pub user: UserInfo,
}

impl AccessReviewRequest {
    /// Build the SubjectAccessReview for this request
    pub fn to_subject_access_review(&self) -> SubjectAccessReview {
        SubjectAccessReview {
            spec: SubjectAccessReviewSpec {
                resource_attributes: Some(ResourceAttributes {
                    namespace: self.namespace.clone(),
                    verb: Some(USE_VERB.to_string()),
                    group: Some(CERTMANAGER_GROUP.to_string()),
                    resource: Some(CLUSTER_ISSUERS_RESOURCE.to_string()),
                    name: Some(self.issuer_name.clone()),
                    ..Default::default()
                }),
                user: Some(self.user.username.clone()),
                groups: Some(self.user.groups.iter().cloned().collect()),
                uid: Some(self.user.uid.clone()).filter(|uid| !uid.is_empty()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Answer from the remote authorizer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessReviewOutcome {
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Remote "can this identity use this issuer" query
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccessReviewer: Send + Sync {
    async fn review(&self, request: &AccessReviewRequest) -> Result<AccessReviewOutcome>;
}

/// Access reviewer backed by the Kubernetes authorization API
#[derive(Clone)]
pub struct KubeAccessReviewer {
    client: Client,
    timeout: Duration,
}

impl KubeAccessReviewer {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl AccessReviewer for KubeAccessReviewer {
    async fn review(&self, request: &AccessReviewRequest) -> Result<AccessReviewOutcome> {
        let reviews: Api<SubjectAccessReview> = Api::all(self.client.clone());
        let sar = request.to_subject_access_review();

        let post_params = PostParams::default();
        let pending = reviews.create(&post_params, &sar);
        let created = tokio::time::timeout(self.timeout, pending)
            .await
            .map_err(|_| Error::ReviewTimeout(self.timeout))??;

        let status = created.status.ok_or_else(|| {
            Error::ReviewIncomplete(format!(
                "no status for user {} on {} {}",
                request.user.username, CLUSTER_ISSUERS_RESOURCE, request.issuer_name
            ))
        })?;

        debug!(
            user = %request.user.username,
            issuer = %request.issuer_name,
            allowed = status.allowed,
            "SubjectAccessReview completed"
        );

        Ok(AccessReviewOutcome {
            allowed: status.allowed,
            reason: status.reason,
        })
    }
}
