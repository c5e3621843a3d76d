//! Certificate admission hook
//!
//! Runs one admission request through decode, authorization and validation and
//! produces exactly one [`AdmissionDecision`]. Validation never runs for a
//! request that failed authorization.
//!
//! Decisions are computed over `&self` and share nothing mutable, so any number
//! may run concurrently. Dropping the future returned by
//! [`ValidatingAdmissionHook::validate`] abandons the request without a decision.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use kube::ResourceExt;
use tracing::{info, warn};

use super::policies::{AuthorizationOutcome, IssuerAccessPolicy};
use super::request::AdmissionRequest;
use super::response::{AdmissionDecision, PipelineOutcome};
use super::review::{AccessReviewRequest, AccessReviewer, KubeAccessReviewer};
use super::validation::{CertificateValidator, StructuralValidator};
use crate::config::{AdmissionConfig, ReviewMode};
use crate::crd::Certificate;
use crate::error::Result;
use crate::metrics::AdmissionMetrics;

/// Resource a validating admission hook serves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidatingResource {
    pub group: &'static str,
    pub version: &'static str,
    pub resource: &'static str,
    pub singular: &'static str,
}

/// Resource served for Certificate admission reviews
pub const CERTIFICATE_ADMISSION_RESOURCE: ValidatingResource = ValidatingResource {
    group: "admission.certmanager.k8s.io",
    version: "v1beta1",
    resource: "certificates",
    singular: "certificate",
};

/// Entry points a host control plane drives
#[async_trait]
pub trait ValidatingAdmissionHook: Send + Sync {
    /// Resource this hook is registered for
    fn validating_resource(&self) -> ValidatingResource;

    /// Connect to the cluster before the first request
    async fn initialize(&mut self, config: kube::Config) -> Result<()>;

    /// Decide a single admission request
    async fn validate(&self, request: &AdmissionRequest) -> AdmissionDecision;
}

/// Admission hook guarding ClusterIssuer use by Certificates
pub struct CertificateAdmissionHook<V = StructuralValidator> {
    config: AdmissionConfig,
    policy: IssuerAccessPolicy,
    validator: V,
    reviewer: Option<Arc<dyn AccessReviewer>>,
    metrics: Option<Arc<AdmissionMetrics>>,
}

impl CertificateAdmissionHook<StructuralValidator> {
    pub fn new(config: AdmissionConfig) -> Self {
        Self::with_validator(config, StructuralValidator)
    }
}

impl<V: CertificateValidator> CertificateAdmissionHook<V> {
    pub fn with_validator(config: AdmissionConfig, validator: V) -> Self {
        Self {
            policy: IssuerAccessPolicy::new(&config),
            config,
            validator,
            reviewer: None,
            metrics: None,
        }
    }

    pub fn with_reviewer(mut self, reviewer: Arc<dyn AccessReviewer>) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<AdmissionMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Run the pipeline and return its terminal state
    pub async fn evaluate(&self, request: &AdmissionRequest) -> PipelineOutcome {
        let certificate = match request.decode() {
            Ok(c) => c,
            Err(e) => {
                warn!(uid = %request.uid, error = %e, "Failed to decode Certificate");
                return PipelineOutcome::DecodeFailed(e);
            }
        };

        let authorization = self.authorize(request, &certificate).await;
        if !authorization.allowed {
            return PipelineOutcome::Denied(authorization);
        }

        let errors = self.validator.validate(&certificate);
        if !errors.is_empty() {
            warn!(
                uid = %request.uid,
                certificate = %certificate.name_any(),
                errors = %errors,
                "Certificate failed validation"
            );
            return PipelineOutcome::Invalid(errors);
        }

        PipelineOutcome::Admitted
    }

    /// Local policy decision, optionally widened by a remote review
    async fn authorize(
        &self,
        request: &AdmissionRequest,
        certificate: &Certificate,
    ) -> AuthorizationOutcome {
        let outcome = self.policy.authorize(&request.user_info, certificate);
        if !certificate.spec.issuer_ref.is_cluster_scoped() {
            return outcome;
        }

        match self.config.review_mode {
            ReviewMode::Disabled => outcome,
            ReviewMode::AuditOnly => {
                self.remote_review(request, certificate).await;
                outcome
            }
            // A remote answer cannot change a local grant
            ReviewMode::GrantOnAllow if outcome.allowed => outcome,
            ReviewMode::GrantOnAllow => {
                if self.remote_review(request, certificate).await != Some(true) {
                    return outcome;
                }
                info!(
                    uid = %request.uid,
                    user = %request.user_info.username,
                    issuer = %certificate.spec.issuer_ref.name,
                    "ClusterIssuer use granted by SubjectAccessReview"
                );
                AuthorizationOutcome::allowed()
            }
        }
    }

    /// Ask the remote authorizer; failures are logged and yield `None`
    async fn remote_review(
        &self,
        request: &AdmissionRequest,
        certificate: &Certificate,
    ) -> Option<bool> {
        if !self.config.review_mode.issues_review() {
            return None;
        }
        let reviewer = self.reviewer.as_ref()?;

        let review = AccessReviewRequest {
            namespace: certificate.namespace().or_else(|| request.namespace.clone()),
            issuer_name: certificate.spec.issuer_ref.name.clone(),
            user: request.user_info.clone(),
        };

        match reviewer.review(&review).await {
            Ok(outcome) => {
                info!(
                    uid = %request.uid,
                    user = %request.user_info.username,
                    issuer = %review.issuer_name,
                    allowed = outcome.allowed,
                    reason = ?outcome.reason,
                    mode = %self.config.review_mode,
                    "SubjectAccessReview result"
                );
                Some(outcome.allowed)
            }
            Err(e) => {
                warn!(
                    uid = %request.uid,
                    user = %request.user_info.username,
                    issuer = %review.issuer_name,
                    error = %e,
                    "SubjectAccessReview failed, continuing with local policy"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_review_failure();
                }
                None
            }
        }
    }
}

#[async_trait]
impl<V: CertificateValidator> ValidatingAdmissionHook for CertificateAdmissionHook<V> {
    fn validating_resource(&self) -> ValidatingResource {
        CERTIFICATE_ADMISSION_RESOURCE
    }

    async fn initialize(&mut self, config: kube::Config) -> Result<()> {
        if !self.config.review_mode.issues_review() {
            info!("Remote access review disabled, skipping Kubernetes client setup");
            return Ok(());
        }

        let client = kube::Client::try_from(config)?;
        self.reviewer = Some(Arc::new(KubeAccessReviewer::new(
            client,
            self.config.review_timeout,
        )));
        info!(
            mode = %self.config.review_mode,
            timeout = ?self.config.review_timeout,
            "Initialized SubjectAccessReview client"
        );
        Ok(())
    }

    async fn validate(&self, request: &AdmissionRequest) -> AdmissionDecision {
        let started = Instant::now();
        info!(
            uid = %request.uid,
            operation = ?request.operation,
            namespace = ?request.namespace,
            user = %request.user_info.username,
            "Processing Certificate admission request"
        );

        let decision = AdmissionDecision::from(self.evaluate(request).await);

        if decision.allowed {
            info!(uid = %request.uid, "Certificate admission request allowed");
        } else {
            warn!(
                uid = %request.uid,
                code = decision.status_code,
                reason = %decision.outcome_label(),
                message = %decision.message,
                "Certificate admission request denied"
            );
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_decision(decision.outcome_label(), started.elapsed().as_secs_f64());
        }

        decision
    }
}
