//! Unit tests for remote access review handling
//!
//! A failing reviewer never blocks a decision; only ReviewMode::GrantOnAllow
//! lets a remote allow widen the local policy.

use std::sync::Arc;

use certificate_admission::webhooks::{
    CertificateAdmissionHook, UserInfo, ValidatingAdmissionHook,
};
use certificate_admission::{AdmissionConfig, AdmissionMetrics, ReviewMode};

use crate::common::*;

fn hook(
    mode: ReviewMode,
    reviewer: Arc<StaticReviewer>,
) -> CertificateAdmissionHook<SpyValidator> {
    CertificateAdmissionHook::with_validator(
        AdmissionConfig::default().with_review_mode(mode),
        SpyValidator::passing(),
    )
    .with_reviewer(reviewer)
}

fn cluster_issuer_request(user: UserInfo) -> certificate_admission::AdmissionRequest {
    CertificateBuilder::new("web", "ns1")
        .with_cluster_issuer("shared")
        .request_for(user)
}

#[tokio::test]
async fn test_audit_only_ignores_remote_allow() {
    let reviewer = StaticReviewer::allowing();
    let hook = hook(ReviewMode::AuditOnly, reviewer.clone());

    let decision = hook.validate(&cluster_issuer_request(untrusted_user("alice"))).await;
    assert!(!decision.allowed);
    assert_eq!(reviewer.calls(), 1);
}

#[tokio::test]
async fn test_audit_only_ignores_remote_deny() {
    let reviewer = StaticReviewer::denying();
    let hook = hook(ReviewMode::AuditOnly, reviewer.clone());

    let admin = UserInfo::new("root").with_groups(["system:masters"]);
    assert!(hook.validate(&cluster_issuer_request(admin)).await.allowed);
    assert_eq!(reviewer.calls(), 1);
}

#[tokio::test]
async fn test_grant_on_allow_widens_local_policy() {
    let reviewer = StaticReviewer::allowing();
    let hook = hook(ReviewMode::GrantOnAllow, reviewer.clone());

    assert!(
        hook.validate(&cluster_issuer_request(untrusted_user("alice")))
            .await
            .allowed
    );
}

#[tokio::test]
async fn test_grant_on_allow_skips_review_after_local_grant() {
    let reviewer = StaticReviewer::denying();
    let hook = hook(ReviewMode::GrantOnAllow, reviewer.clone());

    let admin = UserInfo::new("root").with_groups(["system:masters"]);
    assert!(hook.validate(&cluster_issuer_request(admin)).await.allowed);
    assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn test_unavailable_reviewer_falls_back_to_local_policy() {
    let metrics = Arc::new(AdmissionMetrics::new());
    let reviewer = StaticReviewer::unavailable();
    let hook = hook(ReviewMode::GrantOnAllow, reviewer.clone()).with_metrics(metrics.clone());

    let denied = hook.validate(&cluster_issuer_request(untrusted_user("alice"))).await;
    assert_eq!(denied.status_code, 403);

    let admin = UserInfo::new("root").with_groups(["system:masters"]);
    assert!(hook.validate(&cluster_issuer_request(admin)).await.allowed);

    assert_eq!(reviewer.calls(), 1);
    assert_eq!(metrics.remote_review_failures_total.get(), 1);
}

#[tokio::test]
async fn test_disabled_mode_never_calls_reviewer() {
    let reviewer = StaticReviewer::allowing();
    let hook = hook(ReviewMode::Disabled, reviewer.clone());

    hook.validate(&cluster_issuer_request(untrusted_user("alice"))).await;
    assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn test_decode_failure_never_calls_reviewer() {
    let reviewer = StaticReviewer::allowing();
    let hook = hook(ReviewMode::GrantOnAllow, reviewer.clone());

    let request = certificate_admission::AdmissionRequest::create(
        "uid",
        untrusted_user("alice"),
        b"{\"spec\"".to_vec(),
    );
    assert_eq!(hook.validate(&request).await.status_code, 400);
    assert_eq!(reviewer.calls(), 0);
}
