//! Admission decisions
//!
//! Maps the terminal state of the pipeline to exactly one decision:
//!
//! | Outcome              | allowed | code | reason        |
//! |----------------------|---------|------|---------------|
//! | decode failed        | false   | 400  | BadRequest    |
//! | authorization denied | false   | 403  | Forbidden     |
//! | validation errors    | false   | 406  | NotAcceptable |
//! | admitted             | true    | 200  | -             |

use std::fmt;

use kube::core::Resource;
use kube::core::admission::{AdmissionRequest as KubeAdmissionRequest, AdmissionResponse};

use super::policies::AuthorizationOutcome;
use super::request::DecodeError;
use super::validation::FieldErrorList;

/// Why a request was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecisionReason {
    BadRequest,
    Forbidden,
    NotAcceptable,
}

impl DecisionReason {
    pub fn status_code(&self) -> u16 {
        match self {
            DecisionReason::BadRequest => 400,
            DecisionReason::Forbidden => 403,
            DecisionReason::NotAcceptable => 406,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::BadRequest => "BadRequest",
            DecisionReason::Forbidden => "Forbidden",
            DecisionReason::NotAcceptable => "NotAcceptable",
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of the admission pipeline
#[derive(Debug)]
pub enum PipelineOutcome {
    DecodeFailed(DecodeError),
    Denied(AuthorizationOutcome),
    Invalid(FieldErrorList),
    Admitted,
}

/// The single externally visible result of one admission request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub allowed: bool,
    pub status_code: u16,
    pub reason: Option<DecisionReason>,
    pub message: String,
}

impl AdmissionDecision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            status_code: 200,
            reason: None,
            message: String::new(),
        }
    }

    pub fn rejected(reason: DecisionReason, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            status_code: reason.status_code(),
            reason: Some(reason),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::rejected(DecisionReason::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::rejected(DecisionReason::Forbidden, message)
    }

    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::rejected(DecisionReason::NotAcceptable, message)
    }

    /// Short label for logs and metrics
    pub fn outcome_label(&self) -> &'static str {
        match self.reason {
            None => "allowed",
            Some(DecisionReason::BadRequest) => "bad_request",
            Some(DecisionReason::Forbidden) => "forbidden",
            Some(DecisionReason::NotAcceptable) => "not_acceptable",
        }
    }

    /// Encode as a kube-rs admission response for `request`
    pub fn into_response<T: Resource>(
        self,
        request: &KubeAdmissionRequest<T>,
    ) -> AdmissionResponse {
        let response = AdmissionResponse::from(request);
        if self.allowed {
            return response;
        }

        let mut response = response.deny(self.message);
        response.result.code = self.status_code;
        if let Some(reason) = self.reason {
            response.result.reason = reason.as_str().to_string();
        }
        response
    }
}

impl From<PipelineOutcome> for AdmissionDecision {
    fn from(outcome: PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::DecodeFailed(err) => Self::bad_request(err.to_string()),
            PipelineOutcome::Denied(authorization) => {
                Self::forbidden(authorization.reason.unwrap_or_else(|| {
                    "User is unauthorized to create the Certificate.".to_string()
                }))
            }
            PipelineOutcome::Invalid(errors) => Self::not_acceptable(errors.to_string()),
            PipelineOutcome::Admitted => Self::allowed(),
        }
    }
}
