#[cfg(test)]
#[path = "tests/manifest.rs"]
mod tests;

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// What an app gets installed into.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Stack,
    Organization,
}

impl TargetType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stack => "stack",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("invalid target type `{0}`, expected `stack` or `organization`")]
pub struct InvalidTargetType(String);

impl FromStr for TargetType {
    type Err = InvalidTargetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stack" => Ok(Self::Stack),
            "organization" => Ok(Self::Organization),
            _ => Err(InvalidTargetType(s.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    PublicUnlisted,
}

/// A marketplace app's registered metadata record.
///
/// Fields this tool does not interpret are kept in `extra` so that a manifest
/// fetched with `app get` and pushed back with `app update` loses nothing.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AppManifest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub target_type: TargetType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_uid: Option<String>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_location: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppManifest {
    /// The skeleton posted by `app create`.
    #[must_use]
    pub fn new(name: String, target_type: TargetType) -> Self {
        Self {
            uid: String::new(),
            name,
            description: None,
            target_type,
            version: None,
            organization_uid: None,
            visibility: Visibility::Private,
            ui_location: None,
            oauth: None,
            webhook: None,
            hosting: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        (!self.uid.is_empty()).then_some(self.uid.as_str())
    }

    #[must_use]
    pub fn organization_uid(&self) -> Option<&str> {
        self.organization_uid.as_deref().filter(|uid| !uid.is_empty())
    }
}
