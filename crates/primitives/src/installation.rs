use serde::{Deserialize, Serialize};

use crate::manifest::TargetType;

/// Where an installation lives.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct InstallationTarget {
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub uid: String,
}

/// A binding of an app to an organization or a stack.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Installation {
    pub uid: String,

    pub target: InstallationTarget,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_uid: Option<String>,
}

impl Installation {
    #[must_use]
    pub fn new(uid: String, target_type: TargetType, target_uid: String) -> Self {
        Self {
            uid,
            target: InstallationTarget {
                target_type,
                uid: target_uid,
            },
            status: None,
            organization_uid: None,
        }
    }
}
