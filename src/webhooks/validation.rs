//! Certificate schema validation
//!
//! The admission hook only aggregates what a [`CertificateValidator`] reports.
//! [`StructuralValidator`] covers the basic shape of a Certificate; hosts with
//! stricter rules plug in their own validator.

use std::fmt;

#[cfg(test)]
use mockall::automock;

use crate::crd::{Certificate, IssuerKind};

/// Kind of a field-level validation failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    Invalid(String),
    NotSupported(Vec<String>),
}

/// A single field-level validation failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `spec.secretName`
    pub field: String,
    pub kind: FieldErrorKind,
    pub detail: String,
}

impl FieldError {
    pub fn required(field: &str, detail: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: FieldErrorKind::Required,
            detail: detail.to_string(),
        }
    }

    pub fn invalid(field: &str, value: impl fmt::Display, detail: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: FieldErrorKind::Invalid(value.to_string()),
            detail: detail.to_string(),
        }
    }

    pub fn not_supported(field: &str, value: impl fmt::Display, supported: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            kind: FieldErrorKind::NotSupported(supported.iter().map(|s| s.to_string()).collect()),
            detail: value.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::Required => {
                write!(f, "{}: Required value", self.field)?;
                if !self.detail.is_empty() {
                    write!(f, ": {}", self.detail)?;
                }
                Ok(())
            }
            FieldErrorKind::Invalid(value) => {
                write!(f, "{}: Invalid value: \"{}\"", self.field, value)?;
                if !self.detail.is_empty() {
                    write!(f, ": {}", self.detail)?;
                }
                Ok(())
            }
            FieldErrorKind::NotSupported(supported) => {
                let quoted: Vec<String> = supported.iter().map(|s| format!("\"{}\"", s)).collect();
                write!(
                    f,
                    "{}: Unsupported value: \"{}\": supported values: {}",
                    self.field,
                    self.detail,
                    quoted.join(", ")
                )
            }
        }
    }
}

/// Ordered list of field errors for one Certificate
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrorList(Vec<FieldError>);

impl FieldErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl From<Vec<FieldError>> for FieldErrorList {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl FromIterator<FieldError> for FieldErrorList {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Renders the aggregate: a lone error as-is, several as `[a, b]`
impl fmt::Display for FieldErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => Ok(()),
            [only] => write!(f, "{}", only),
            errors => {
                let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

/// Checks the structure of a decoded Certificate
#[cfg_attr(test, automock)]
pub trait CertificateValidator: Send + Sync {
    fn validate(&self, certificate: &Certificate) -> FieldErrorList;
}

const SUPPORTED_KEY_ALGORITHMS: [&str; 2] = ["rsa", "ecdsa"];
const SUPPORTED_KEY_ENCODINGS: [&str; 2] = ["pkcs1", "pkcs8"];
const SUPPORTED_ECDSA_SIZES: [i32; 3] = [256, 384, 521];
const MIN_RSA_KEY_SIZE: i32 = 2048;
const MAX_RSA_KEY_SIZE: i32 = 8192;

/// Minimal structural rules for a Certificate
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralValidator;

impl CertificateValidator for StructuralValidator {
    fn validate(&self, certificate: &Certificate) -> FieldErrorList {
        let spec = &certificate.spec;
        let mut errors = FieldErrorList::new();

        if spec.secret_name.trim().is_empty() {
            errors.push(FieldError::required("spec.secretName", "must be specified"));
        }

        if spec.issuer_ref.name.trim().is_empty() {
            errors.push(FieldError::required("spec.issuerRef.name", "must be specified"));
        }

        if let Some(IssuerKind::Unknown(kind)) = &spec.issuer_ref.kind {
            errors.push(FieldError::not_supported(
                "spec.issuerRef.kind",
                kind,
                &IssuerKind::SUPPORTED,
            ));
        }

        let has_common_name = spec
            .common_name
            .as_deref()
            .is_some_and(|cn| !cn.trim().is_empty());
        if !has_common_name && spec.dns_names.is_empty() {
            errors.push(FieldError::required(
                "spec",
                "at least one of commonName or dnsNames must be set",
            ));
        }

        if let Some(encoding) = spec.key_encoding.as_deref()
            && !SUPPORTED_KEY_ENCODINGS.contains(&encoding)
        {
            errors.push(FieldError::not_supported(
                "spec.keyEncoding",
                encoding,
                &SUPPORTED_KEY_ENCODINGS,
            ));
        }

        validate_key(spec.key_algorithm.as_deref(), spec.key_size, &mut errors);

        errors
    }
}

/// Key size must be valid for the algorithm. An absent or empty algorithm means
/// RSA, and a zero size means the algorithm's default.
fn validate_key(algorithm: Option<&str>, size: Option<i32>, errors: &mut FieldErrorList) {
    let size = size.filter(|size| *size != 0);
    match algorithm.filter(|a| !a.is_empty()).unwrap_or("rsa") {
        "rsa" => {
            if let Some(size) = size
                && !(MIN_RSA_KEY_SIZE..=MAX_RSA_KEY_SIZE).contains(&size)
            {
                errors.push(FieldError::invalid(
                    "spec.keySize",
                    size,
                    &format!(
                        "must be between {} & {} for rsa keyAlgorithm",
                        MIN_RSA_KEY_SIZE, MAX_RSA_KEY_SIZE
                    ),
                ));
            }
        }
        "ecdsa" => {
            if let Some(size) = size
                && !SUPPORTED_ECDSA_SIZES.contains(&size)
            {
                errors.push(FieldError::not_supported(
                    "spec.keySize",
                    size,
                    &["256", "384", "521"],
                ));
            }
        }
        other => errors.push(FieldError::not_supported(
            "spec.keyAlgorithm",
            other,
            &SUPPORTED_KEY_ALGORITHMS,
        )),
    }
}
