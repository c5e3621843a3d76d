pub mod config;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod webhooks;

pub use config::{AdmissionConfig, ReviewMode};
pub use crd::{Certificate, CertificateSpec, IssuerKind, IssuerRef};
pub use error::{Error, Result};
pub use metrics::AdmissionMetrics;
pub use webhooks::{
    AdmissionDecision, AdmissionRequest, CertificateAdmissionHook, DecisionReason, UserInfo,
    ValidatingAdmissionHook,
};
