//! Unit tests for the admission decision pipeline
//!
//! These tests drive the public hook API (CertificateAdmissionHook::validate)
//! with raw request payloads and check the single decision it produces.
//!
//! Note: Internal policy tests are in src/webhooks/policies/*.rs

use certificate_admission::AdmissionConfig;
use certificate_admission::webhooks::{
    AdmissionDecision, AdmissionRequest, CertificateAdmissionHook, DecisionReason, FieldError,
    UserInfo, ValidatingAdmissionHook,
};

use crate::common::*;

// =============================================================================
// Helper Functions
// =============================================================================

fn hook_with(validator: SpyValidator) -> CertificateAdmissionHook<SpyValidator> {
    CertificateAdmissionHook::with_validator(AdmissionConfig::default(), validator)
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[tokio::test]
async fn test_namespaced_issuer_allowed_for_any_caller() {
    let validator = SpyValidator::passing();
    let hook = hook_with(validator.clone());

    let request = CertificateBuilder::new("web", "ns1")
        .with_issuer("x")
        .request_for(UserInfo::new("anyone"));
    let decision = hook.validate(&request).await;

    assert_eq!(decision, AdmissionDecision::allowed());
    assert_eq!(validator.calls(), 1);
}

#[tokio::test]
async fn test_cluster_admin_allowed_cluster_issuer() {
    let hook = hook_with(SpyValidator::passing());
    let request = CertificateBuilder::new("web", "ns1")
        .with_cluster_issuer("y")
        .request_for(UserInfo::new("root").with_groups(["system:masters"]));

    assert!(hook.validate(&request).await.allowed);
}

#[tokio::test]
async fn test_cert_manager_service_account_allowed_cluster_issuer() {
    let hook = hook_with(SpyValidator::passing());
    let request = CertificateBuilder::new("web", "ns1")
        .with_cluster_issuer("y")
        .request_for(
            UserInfo::new("system:serviceaccount:cert-manager:cert-manager")
                .with_groups(["system:serviceaccounts", "system:serviceaccounts:cert-manager"]),
        );

    assert!(hook.validate(&request).await.allowed);
}

#[tokio::test]
async fn test_untrusted_caller_forbidden_cluster_issuer() {
    let validator = SpyValidator::passing();
    let hook = hook_with(validator.clone());
    let request = CertificateBuilder::new("web", "ns1")
        .with_cluster_issuer("letsencrypt-prod")
        .request_for(untrusted_user("alice"));

    let decision = hook.validate(&request).await;
    assert!(!decision.allowed);
    assert_eq!(decision.status_code, 403);
    assert_eq!(decision.reason, Some(DecisionReason::Forbidden));
    assert!(decision.message.contains("web"));
    assert!(decision.message.contains("letsencrypt-prod"));
    assert_eq!(validator.calls(), 0, "validator must not run for denied requests");
}

#[tokio::test]
async fn test_schema_errors_hidden_from_unauthorized_caller() {
    let validator = SpyValidator::failing(vec![FieldError::required("spec.secretName", "")]);
    let hook = hook_with(validator.clone());
    let request = CertificateBuilder::new("web", "ns1")
        .with_cluster_issuer("y")
        .request_for(untrusted_user("alice"));

    let decision = hook.validate(&request).await;
    assert_eq!(decision.reason, Some(DecisionReason::Forbidden));
    assert!(!decision.message.contains("secretName"));
    assert_eq!(validator.calls(), 0);
}

#[tokio::test]
async fn test_schema_errors_reported_for_authorized_caller() {
    let validator = SpyValidator::failing(vec![
        FieldError::required("spec.secretName", "must be specified"),
        FieldError::invalid("spec.keySize", 1024, "too small"),
    ]);
    let hook = hook_with(validator.clone());
    let request = CertificateBuilder::new("web", "ns1").request_for(UserInfo::new("alice"));

    let decision = hook.validate(&request).await;
    assert!(!decision.allowed);
    assert_eq!(decision.status_code, 406);
    assert_eq!(decision.reason, Some(DecisionReason::NotAcceptable));
    assert_eq!(
        decision.message,
        "[spec.secretName: Required value: must be specified, spec.keySize: Invalid value: \"1024\": too small]"
    );
    assert_eq!(validator.calls(), 1);
}

#[tokio::test]
async fn test_default_validator_rejects_certificate_without_subject() {
    let hook = CertificateAdmissionHook::new(AdmissionConfig::default());
    let request = CertificateBuilder::new("web", "ns1")
        .without_subject()
        .request_for(UserInfo::new("alice"));

    let decision = hook.validate(&request).await;
    assert_eq!(decision.reason, Some(DecisionReason::NotAcceptable));
    assert!(decision.message.contains("commonName or dnsNames"));
}

#[tokio::test]
async fn test_missing_kind_treated_as_namespaced_issuer() {
    let hook = hook_with(SpyValidator::passing());
    let request = CertificateBuilder::new("web", "ns1")
        .without_issuer_kind()
        .request_for(untrusted_user("alice"));

    assert!(hook.validate(&request).await.allowed);
}

#[tokio::test]
async fn test_empty_kind_treated_as_namespaced_issuer() {
    let validator = SpyValidator::passing();
    let hook = hook_with(validator.clone());
    let request = CertificateBuilder::new("web", "ns1")
        .with_issuer_kind("y", "")
        .request_for(untrusted_user("alice"));

    assert_eq!(hook.validate(&request).await, AdmissionDecision::allowed());
    assert_eq!(validator.calls(), 1);
}

#[tokio::test]
async fn test_unknown_kind_authorized_then_rejected_by_validation() {
    let hook = CertificateAdmissionHook::new(AdmissionConfig::default());
    let request = CertificateBuilder::new("web", "ns1")
        .with_issuer_kind("vault", "VaultIssuer")
        .request_for(untrusted_user("alice"));

    let decision = hook.validate(&request).await;
    assert!(!decision.allowed);
    assert_eq!(decision.status_code, 406);
    assert_eq!(decision.reason, Some(DecisionReason::NotAcceptable));
    assert!(
        decision
            .message
            .starts_with("spec.issuerRef.kind: Unsupported value: \"VaultIssuer\"")
    );
}

#[tokio::test]
async fn test_empty_kind_passes_default_validation() {
    let hook = CertificateAdmissionHook::new(AdmissionConfig::default());
    let request = CertificateBuilder::new("web", "ns1")
        .with_issuer_kind("y", "")
        .request_for(UserInfo::new("alice"));

    assert!(hook.validate(&request).await.allowed);
}

// =============================================================================
// Malformed payloads
// =============================================================================

#[tokio::test]
async fn test_malformed_payloads_are_bad_requests() {
    let validator = SpyValidator::passing();
    let hook = hook_with(validator.clone());
    let admin = UserInfo::new("root").with_groups(["system:masters"]);

    let payloads: Vec<Vec<u8>> = vec![
        vec![],
        b"not json".to_vec(),
        b"{\"metadata\":{\"name\":\"web\"}".to_vec(),
        b"[]".to_vec(),
        br#"{"metadata":{"name":"web"},"spec":{"secretName":"tls"}}"#.to_vec(),
        br#"{"metadata":{"name":"web"},"spec":{"secretName":"tls","issuerRef":{"kind":"Issuer"}}}"#
            .to_vec(),
    ];

    for payload in payloads {
        let request = AdmissionRequest::create("uid", admin.clone(), payload.clone());
        let decision = hook.validate(&request).await;
        assert!(!decision.allowed, "payload {:?}", String::from_utf8_lossy(&payload));
        assert_eq!(decision.status_code, 400);
        assert_eq!(decision.reason, Some(DecisionReason::BadRequest));
        assert!(!decision.message.is_empty());
    }
    assert_eq!(validator.calls(), 0);
}

// =============================================================================
// Determinism
// =============================================================================

#[tokio::test]
async fn test_repeated_decisions_are_identical() {
    let config = AdmissionConfig::default()
        .with_default_admin(TEST_ADMIN)
        .with_identity_provider_url(TEST_IDP);
    let hook = CertificateAdmissionHook::new(config);

    let requests = [
        CertificateBuilder::new("a", "ns1").request_for(untrusted_user("alice")),
        CertificateBuilder::new("b", "ns1")
            .with_cluster_issuer("y")
            .request_for(untrusted_user("alice")),
        CertificateBuilder::new("c", "ns1")
            .with_cluster_issuer("y")
            .request_for(UserInfo::new("https://idp.example#admin")),
        AdmissionRequest::create("d", untrusted_user("alice"), b"{".to_vec()),
    ];

    for request in &requests {
        let first = hook.validate(request).await;
        let second = hook.validate(request).await;
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_concurrent_decisions_are_independent() {
    let hook = std::sync::Arc::new(hook_with(SpyValidator::passing()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let hook = hook.clone();
        handles.push(tokio::spawn(async move {
            let user = if i % 2 == 0 {
                UserInfo::new("root").with_groups(["system:masters"])
            } else {
                untrusted_user("alice")
            };
            let request = CertificateBuilder::new(&format!("cert-{}", i), "ns1")
                .with_cluster_issuer("y")
                .request_for(user);
            (i, hook.validate(&request).await)
        }));
    }

    for handle in handles {
        let (i, decision) = handle.await.unwrap();
        assert_eq!(decision.allowed, i % 2 == 0, "request {}", i);
    }
}
