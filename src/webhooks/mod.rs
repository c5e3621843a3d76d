//! Validating admission hook for cert-manager Certificates
//!
//! A request flows through:
//! - decoding of the raw object into a [`Certificate`](crate::crd::Certificate)
//! - the ClusterIssuer access policy
//! - schema validation, only once authorized
//! - a single [`AdmissionDecision`]

mod hook;
pub mod identity;
pub mod policies;
mod request;
mod response;
pub mod review;
pub mod validation;

pub use hook::{
    CERTIFICATE_ADMISSION_RESOURCE, CertificateAdmissionHook, ValidatingAdmissionHook,
    ValidatingResource,
};
pub use identity::UserInfo;
pub use policies::{AuthorizationOutcome, IssuerAccessPolicy};
pub use request::{AdmissionRequest, DecodeError, decode_certificate};
pub use response::{AdmissionDecision, DecisionReason, PipelineOutcome};
pub use review::{AccessReviewOutcome, AccessReviewRequest, AccessReviewer, KubeAccessReviewer};
pub use validation::{CertificateValidator, FieldError, FieldErrorList, StructuralValidator};

// Re-export kube-rs admission types for hosts speaking admission.k8s.io
pub use kube::core::admission::{AdmissionResponse, AdmissionReview, Operation};
