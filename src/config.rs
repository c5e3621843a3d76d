//! Admission hook configuration
//!
//! Configuration is read once when the hook is built and then passed around as
//! a value. Decisions never consult the process environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Identifier of the designated cluster administrator
pub const DEFAULT_ADMIN_ENV: &str = "DEFAULT_ADMIN";
/// Base URL of the identity provider that issues the administrator's username
pub const OIDC_URL_ENV: &str = "OIDC_URL";
/// How remote access review results are used
pub const REVIEW_MODE_ENV: &str = "CERTIFICATE_ADMISSION_REVIEW_MODE";
/// Timeout for a single remote access review, in seconds
pub const REVIEW_TIMEOUT_ENV: &str = "CERTIFICATE_ADMISSION_REVIEW_TIMEOUT_SECS";

/// Default timeout for remote access reviews
pub const DEFAULT_REVIEW_TIMEOUT: Duration = Duration::from_secs(5);

/// How the result of a remote SubjectAccessReview affects the decision
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReviewMode {
    /// No remote review is issued
    Disabled,
    /// Review is issued and logged; the local checks alone decide.
    ///
    /// The review is awaited before the decision is returned, so ClusterIssuer
    /// requests can take up to the review timeout longer.
    #[default]
    AuditOnly,
    /// A remote allow also authorizes a request the local checks denied. The
    /// review is only issued after a local denial.
    GrantOnAllow,
}

impl ReviewMode {
    pub fn issues_review(&self) -> bool {
        !matches!(self, ReviewMode::Disabled)
    }
}

impl FromStr for ReviewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" => Ok(ReviewMode::Disabled),
            "audit-only" | "audit" => Ok(ReviewMode::AuditOnly),
            "grant-on-allow" | "grant" => Ok(ReviewMode::GrantOnAllow),
            other => Err(Error::InvalidConfig(format!(
                "unknown review mode '{}', expected one of disabled, audit-only, grant-on-allow",
                other
            ))),
        }
    }
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewMode::Disabled => write!(f, "disabled"),
            ReviewMode::AuditOnly => write!(f, "audit-only"),
            ReviewMode::GrantOnAllow => write!(f, "grant-on-allow"),
        }
    }
}

/// Static configuration for the certificate admission hook
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Designated cluster administrator identifier (username fragment)
    pub default_admin: Option<String>,
    /// Identity provider base URL the administrator's username is rooted at
    pub identity_provider_url: Option<String>,
    pub review_mode: ReviewMode,
    pub review_timeout: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            default_admin: None,
            identity_provider_url: None,
            review_mode: ReviewMode::default(),
            review_timeout: DEFAULT_REVIEW_TIMEOUT,
        }
    }
}

impl AdmissionConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let review_mode = match lookup(REVIEW_MODE_ENV) {
            Some(mode) => mode.parse()?,
            None => ReviewMode::default(),
        };

        let review_timeout = match lookup(REVIEW_TIMEOUT_ENV) {
            Some(secs) => parse_timeout(&secs)?,
            None => DEFAULT_REVIEW_TIMEOUT,
        };

        Ok(Self {
            default_admin: lookup(DEFAULT_ADMIN_ENV),
            identity_provider_url: lookup(OIDC_URL_ENV),
            review_mode,
            review_timeout,
        })
    }

    pub fn with_default_admin(mut self, admin: impl Into<String>) -> Self {
        self.default_admin = Some(admin.into());
        self
    }

    pub fn with_identity_provider_url(mut self, url: impl Into<String>) -> Self {
        self.identity_provider_url = Some(url.into());
        self
    }

    pub fn with_review_mode(mut self, mode: ReviewMode) -> Self {
        self.review_mode = mode;
        self
    }

    pub fn with_review_timeout(mut self, timeout: Duration) -> Self {
        self.review_timeout = timeout;
        self
    }
}

fn parse_timeout(value: &str) -> Result<Duration> {
    let secs: u64 = value.trim().parse().map_err(|_| {
        Error::InvalidConfig(format!(
            "{} must be a positive integer, got '{}'",
            REVIEW_TIMEOUT_ENV, value
        ))
    })?;

    if secs == 0 {
        return Err(Error::InvalidConfig(format!(
            "{} must be greater than zero",
            REVIEW_TIMEOUT_ENV
        )));
    }

    Ok(Duration::from_secs(secs))
}
