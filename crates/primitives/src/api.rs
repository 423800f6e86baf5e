use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::manifest::{AppManifest, TargetType};
use crate::organization::{Organization, Stack};

/// One page of a list endpoint together with the server-reported total, if
/// the server reported one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: Option<u64>,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, count: Option<u64>) -> Self {
        Self { items, count }
    }
}

/// Developer hub responses wrap their payload in `data`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

// -------------------------------------------- Management API --------------------------------------------
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListOrganizationsResponse {
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl From<ListOrganizationsResponse> for Page<Organization> {
    fn from(response: ListOrganizationsResponse) -> Self {
        Self::new(response.organizations, response.count)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListStacksResponse {
    pub stacks: Vec<Stack>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl From<ListStacksResponse> for Page<Stack> {
    fn from(response: ListStacksResponse) -> Self {
        Self::new(response.stacks, response.count)
    }
}

// -------------------------------------------- Developer hub API --------------------------------------------
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ListManifestsResponse {
    pub data: Vec<AppManifest>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl From<ListManifestsResponse> for Page<AppManifest> {
    fn from(response: ListManifestsResponse) -> Self {
        Self::new(response.data, response.count)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InstallRequest {
    pub target_type: TargetType,
    pub target_uid: String,
}

impl InstallRequest {
    #[must_use]
    pub const fn new(target_type: TargetType, target_uid: String) -> Self {
        Self {
            target_type,
            target_uid,
        }
    }
}

// -------------------------------------------- Launch API --------------------------------------------
#[derive(Clone, Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}
