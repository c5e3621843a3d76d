//! Admission requests and Certificate decoding

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest as KubeAdmissionRequest, Operation};
use thiserror::Error;

use super::identity::UserInfo;
use crate::crd::Certificate;

/// A single admission request for a Certificate
#[derive(Clone, Debug)]
pub struct AdmissionRequest {
    pub uid: String,
    pub namespace: Option<String>,
    pub operation: Operation,
    pub user_info: UserInfo,
    /// Raw JSON of the object being admitted
    pub object: Vec<u8>,
}

impl AdmissionRequest {
    /// Build a CREATE request for `object`
    pub fn create(uid: impl Into<String>, user_info: UserInfo, object: Vec<u8>) -> Self {
        Self {
            uid: uid.into(),
            namespace: None,
            operation: Operation::Create,
            user_info,
            object,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Adapt a kube-rs admission request, re-encoding its object to raw JSON
    pub fn from_review(request: &KubeAdmissionRequest<DynamicObject>) -> Self {
        // Serializing an already-parsed DynamicObject cannot fail in practice; an
        // empty payload decodes to MissingObject below either way.
        let object = request
            .object
            .as_ref()
            .and_then(|obj| serde_json::to_vec(obj).ok())
            .unwrap_or_default();

        Self {
            uid: request.uid.clone(),
            namespace: request.namespace.clone(),
            operation: request.operation.clone(),
            user_info: UserInfo::from(&request.user_info),
            object,
        }
    }

    /// Decode the request payload into a Certificate
    pub fn decode(&self) -> Result<Certificate, DecodeError> {
        decode_certificate(&self.object)
    }
}

/// The payload could not be turned into a Certificate
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("request does not contain an object")]
    MissingObject,

    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode raw JSON bytes into a Certificate.
///
/// Fails on empty, truncated or malformed JSON and on objects missing any
/// required Certificate field.
pub fn decode_certificate(raw: &[u8]) -> Result<Certificate, DecodeError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::MissingObject);
    }
    Ok(serde_json::from_slice(raw)?)
}
