//! Caller identity carried on an admission request

use std::collections::BTreeSet;

use k8s_openapi::api::authentication::v1::UserInfo as KubeUserInfo;
use tracing::debug;

/// Identity of the user or service account that issued the request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
    pub groups: BTreeSet<String>,
    pub uid: String,
}

impl UserInfo {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Fragment of the username when it is a URL, e.g. `admin` for
    /// `https://idp.example#admin`.
    ///
    /// Usernames that are not absolute URLs, or carry an empty fragment,
    /// yield `None`.
    pub fn username_fragment(&self) -> Option<String> {
        match url::Url::parse(&self.username) {
            Ok(parsed) => parsed
                .fragment()
                .filter(|fragment| !fragment.is_empty())
                .map(str::to_string),
            Err(e) => {
                debug!(
                    user = %self.username,
                    error = %e,
                    "Username is not a URL, designated admin override does not apply"
                );
                None
            }
        }
    }
}

impl From<&KubeUserInfo> for UserInfo {
    fn from(info: &KubeUserInfo) -> Self {
        Self {
            username: info.username.clone().unwrap_or_default(),
            groups: info.groups.iter().flatten().cloned().collect(),
            uid: info.uid.clone().unwrap_or_default(),
        }
    }
}
