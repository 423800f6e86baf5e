use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Organization {
    pub uid: String,
    pub name: String,
}

impl Organization {
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Stack {
    pub api_key: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_uid: Option<String>,
}

impl Stack {
    #[must_use]
    pub fn new(api_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            name: name.into(),
            org_uid: None,
        }
    }
}
