use core::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingProvider {
    /// The user hosts the app at a URL of their choosing.
    External,
    /// The app is served by a Launch project.
    Launch,
}

impl fmt::Display for HostingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::External => "external",
            Self::Launch => "launch",
        })
    }
}

/// Body of the single hosting update issued by `app deploy`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HostingPayload {
    pub provider: HostingProvider,

    pub deployment_url: Url,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_uid: Option<String>,
}

impl HostingPayload {
    #[must_use]
    pub const fn external(deployment_url: Url) -> Self {
        Self {
            provider: HostingProvider::External,
            deployment_url,
            environment_uid: None,
            project_uid: None,
        }
    }

    #[must_use]
    pub const fn launch(deployment_url: Url, environment_uid: String, project_uid: String) -> Self {
        Self {
            provider: HostingProvider::Launch,
            deployment_url,
            environment_uid: Some(environment_uid),
            project_uid: Some(project_uid),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct DisconnectRequest {
    pub provider: HostingProvider,
}

/// A hosted project as reported by Launch.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LaunchProject {
    pub uid: String,

    pub name: String,

    /// The developer hub app this project currently serves, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_hub_app_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<Url>,
}

impl LaunchProject {
    /// Whether the project is linked to an app other than `app_uid`.
    #[must_use]
    pub fn linked_to_other_app(&self, app_uid: &str) -> Option<&str> {
        self.developer_hub_app_uid
            .as_deref()
            .filter(|linked| !linked.is_empty() && *linked != app_uid)
    }
}
