//! cert-manager Certificate resource
//!
//! Typed view of the `certmanager.k8s.io/v1alpha1` Certificate that admission
//! requests carry. Only the fields the admission hook reads are modelled;
//! everything else in the object is ignored during decoding.
//!
//! Required fields have no serde defaults so a payload missing them fails to
//! decode instead of producing a half-populated object.

use std::fmt;

use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// API group of the cert-manager resources
pub const CERTMANAGER_GROUP: &str = "certmanager.k8s.io";

/// Certificate is the Schema for the certificates API
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[kube(
    group = "certmanager.k8s.io",
    version = "v1alpha1",
    kind = "Certificate",
    plural = "certificates",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Name of the Secret the issued keypair is stored in
    pub secret_name: String,

    /// Issuer that should sign this certificate
    pub issuer_ref: IssuerRef,

    /// Common name to be used on the certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// DNS subjectAltNames to be set on the certificate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_names: Vec<String>,

    /// IP subjectAltNames to be set on the certificate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organization: Vec<String>,

    /// Requested validity (e.g. "2160h")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Time before expiry at which the certificate is renewed (e.g. "360h")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_before: Option<String>,

    #[serde(default, rename = "isCA")]
    pub is_ca: bool,

    /// Private key size in bits (RSA) or curve size (ECDSA)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_size: Option<i32>,

    /// Private key algorithm ("rsa" or "ecdsa")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,

    /// Private key encoding ("pkcs1" or "pkcs8")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_encoding: Option<String>,
}

/// Reference to the issuer that signs a Certificate
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRef {
    pub name: String,

    /// Issuer kind; absent or empty means a namespaced `Issuer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<IssuerKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl IssuerRef {
    /// Kind of the referenced issuer, resolving an absent kind to `Issuer`
    pub fn effective_kind(&self) -> IssuerKind {
        self.kind.clone().unwrap_or_default()
    }

    /// Whether this reference points at a cluster-scoped issuer
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(self.kind, Some(IssuerKind::ClusterIssuer))
    }
}

/// Issuer kinds a Certificate may reference
///
/// Decoding never fails on the kind: an empty string is a namespaced `Issuer`
/// and anything unrecognised is kept as [`IssuerKind::Unknown`] for validation
/// to reject.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum IssuerKind {
    /// Namespace-local issuer
    #[default]
    Issuer,
    /// Issuer whose authority spans the whole cluster
    ClusterIssuer,
    Unknown(String),
}

impl IssuerKind {
    /// Kind names cert-manager accepts
    pub const SUPPORTED: [&'static str; 2] = ["Issuer", "ClusterIssuer"];

    pub fn as_str(&self) -> &str {
        match self {
            IssuerKind::Issuer => "Issuer",
            IssuerKind::ClusterIssuer => "ClusterIssuer",
            IssuerKind::Unknown(kind) => kind,
        }
    }
}

impl From<String> for IssuerKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "" | "Issuer" => IssuerKind::Issuer,
            "ClusterIssuer" => IssuerKind::ClusterIssuer,
            _ => IssuerKind::Unknown(kind),
        }
    }
}

impl From<IssuerKind> for String {
    fn from(kind: IssuerKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for IssuerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
