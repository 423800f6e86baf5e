use std::collections::BTreeMap;

use appctl_client::Endpoints;
use camino::Utf8Path;
use eyre::{bail, Result as EyreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::warn;
use url::Url;

use crate::defaults;

/// Keys a `--config` file may not override.
pub const OVERRIDE_DENYLIST: [&str; 3] = ["manifestPath", "boilerplateName", "developerHubUrls"];

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RegionEndpoints {
    pub management: Url,
    pub developer_hub: Url,
    pub launch: Url,
}

/// Runtime configuration shared by every command.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Suggested name for `app create`.
    pub default_app_name: String,

    /// Manifest files are named `<default_app_file_name>.json`.
    pub default_app_file_name: String,

    /// Service endpoints per region.
    pub developer_hub_urls: BTreeMap<String, RegionEndpoints>,
}

impl Default for Config {
    fn default() -> Self {
        let regions = [
            ("NA", "na"),
            ("EU", "eu"),
            ("AZURE-NA", "azure-na"),
            ("AZURE-EU", "azure-eu"),
            ("GCP-NA", "gcp-na"),
        ];

        let developer_hub_urls = regions
            .into_iter()
            .filter_map(|(region, host)| {
                let endpoints = RegionEndpoints {
                    management: Url::parse(&format!("https://{host}-api.appctl.dev")).ok()?,
                    developer_hub: Url::parse(&format!("https://{host}-developerhub-api.appctl.dev"))
                        .ok()?,
                    launch: Url::parse(&format!("https://{host}-launch-api.appctl.dev")).ok()?,
                };
                Some((region.to_owned(), endpoints))
            })
            .collect();

        Self {
            default_app_name: defaults::DEFAULT_APP_NAME.to_owned(),
            default_app_file_name: defaults::DEFAULT_APP_FILE_NAME.to_owned(),
            developer_hub_urls,
        }
    }
}

impl Config {
    /// Shallow-merges the JSON object in `path` over `self`.
    ///
    /// An unreadable or malformed file leaves the configuration untouched; the
    /// problem is only reported as a warning.
    pub async fn with_override(self, path: &Utf8Path) -> Self {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) => {
                warn!(%path, %err, "ignoring unreadable config file");
                return self;
            }
        };

        match self.merged(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(%path, %err, "ignoring malformed config file");
                self
            }
        }
    }

    fn merged(&self, contents: &str) -> EyreResult<Self> {
        let Value::Object(overrides) = serde_json::from_str::<Value>(contents)? else {
            bail!("expected a JSON object");
        };

        let Value::Object(mut base) = serde_json::to_value(self)? else {
            bail!("configuration did not serialize to an object");
        };

        for (key, value) in overrides {
            if OVERRIDE_DENYLIST.contains(&key.as_str()) {
                continue;
            }
            let _previous = base.insert(key, value);
        }

        Ok(serde_json::from_value(Value::Object(base))?)
    }

    pub fn endpoints(&self, region: &str) -> EyreResult<Endpoints> {
        let Some(region_endpoints) = self.developer_hub_urls.get(&region.to_ascii_uppercase())
        else {
            let known = self
                .developer_hub_urls
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            bail!("Unknown region '{region}', expected one of: {known}");
        };

        Ok(Endpoints {
            management: region_endpoints.management.clone(),
            developer_hub: region_endpoints.developer_hub.clone(),
            launch: region_endpoints.launch.clone(),
        })
    }

    #[must_use]
    pub fn manifest_file_name(&self) -> String {
        format!("{}.json", self.default_app_file_name)
    }
}
