//! HTTP implementation of [`MarketplaceApi`] and [`LaunchApi`].

use appctl_primitives::api::{
    DataResponse, GraphQlRequest, GraphQlResponse, InstallRequest, ListManifestsResponse,
    ListOrganizationsResponse, ListStacksResponse, Page,
};
use appctl_primitives::hosting::{DisconnectRequest, HostingPayload, HostingProvider, LaunchProject};
use appctl_primitives::installation::Installation;
use appctl_primitives::manifest::{AppManifest, TargetType};
use appctl_primitives::organization::{Organization, Stack};
use async_trait::async_trait;
use eyre::{bail, eyre, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::connection::ConnectionInfo;
use crate::launch::{
    CreateProjectData, ProjectsData, CREATE_PROJECT_MUTATION, GRAPHQL_PATH, PROJECTS_QUERY,
};
use crate::traits::{LaunchApi, MarketplaceApi};

/// Base URLs of the three services a command may talk to.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub management: Url,
    pub developer_hub: Url,
    pub launch: Url,
}

#[derive(Clone, Debug)]
pub struct Client {
    management: ConnectionInfo,
    developer_hub: ConnectionInfo,
    launch: ConnectionInfo,
}

impl Client {
    #[must_use]
    pub fn new(endpoints: Endpoints, auth_token: Option<String>) -> Self {
        Self {
            management: ConnectionInfo::new(endpoints.management, auth_token.clone()),
            developer_hub: ConnectionInfo::new(endpoints.developer_hub, auth_token.clone()),
            launch: ConnectionInfo::new(endpoints.launch, auth_token),
        }
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        organization_uid: &str,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let response: GraphQlResponse<T> = self
            .launch
            .post(
                GRAPHQL_PATH,
                Some(organization_uid),
                GraphQlRequest { query, variables },
            )
            .await?;

        if let Some(error) = response.errors.into_iter().next() {
            bail!("Launch request failed: {}", error.message);
        }

        response
            .data
            .ok_or_else(|| eyre!("Launch returned an empty response"))
    }
}

fn page_query(skip: u64, limit: u64) -> Vec<(&'static str, String)> {
    vec![
        ("skip", skip.to_string()),
        ("limit", limit.to_string()),
        ("asc", "name".to_owned()),
        ("include_count", "true".to_owned()),
    ]
}

#[async_trait]
impl MarketplaceApi for Client {
    async fn list_organizations(&self, skip: u64, limit: u64) -> Result<Page<Organization>> {
        let response: ListOrganizationsResponse = self
            .management
            .get("v3/organizations", &page_query(skip, limit), None)
            .await?;
        Ok(response.into())
    }

    async fn list_stacks(
        &self,
        organization_uid: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Page<Stack>> {
        let response: ListStacksResponse = self
            .management
            .get("v3/stacks", &page_query(skip, limit), Some(organization_uid))
            .await?;
        Ok(response.into())
    }

    async fn list_apps(
        &self,
        organization_uid: &str,
        target_type: Option<TargetType>,
        skip: u64,
        limit: u64,
    ) -> Result<Page<AppManifest>> {
        let mut query = page_query(skip, limit);
        if let Some(target_type) = target_type {
            query.push(("target_type", target_type.to_string()));
        }

        let response: ListManifestsResponse = self
            .developer_hub
            .get("manifests", &query, Some(organization_uid))
            .await?;
        Ok(response.into())
    }

    async fn get_app(&self, organization_uid: &str, app_uid: &str) -> Result<AppManifest> {
        let response: DataResponse<AppManifest> = self
            .developer_hub
            .get(&format!("manifests/{app_uid}"), &[], Some(organization_uid))
            .await?;
        Ok(response.data)
    }

    async fn create_app(
        &self,
        organization_uid: &str,
        manifest: &AppManifest,
    ) -> Result<AppManifest> {
        let response: DataResponse<AppManifest> = self
            .developer_hub
            .post("manifests", Some(organization_uid), manifest)
            .await?;
        Ok(response.data)
    }

    async fn update_app(
        &self,
        organization_uid: &str,
        manifest: &AppManifest,
    ) -> Result<AppManifest> {
        let response: DataResponse<AppManifest> = self
            .developer_hub
            .put(
                &format!("manifests/{}", manifest.uid),
                Some(organization_uid),
                manifest,
            )
            .await?;
        Ok(response.data)
    }

    async fn delete_app(&self, organization_uid: &str, app_uid: &str) -> Result<()> {
        let _ignored: Value = self
            .developer_hub
            .delete(&format!("manifests/{app_uid}"), Some(organization_uid))
            .await?;
        Ok(())
    }

    async fn list_installations(
        &self,
        organization_uid: &str,
        app_uid: &str,
    ) -> Result<Vec<Installation>> {
        let response: DataResponse<Vec<Installation>> = self
            .developer_hub
            .get(
                &format!("manifests/{app_uid}/installations"),
                &[],
                Some(organization_uid),
            )
            .await?;
        Ok(response.data)
    }

    async fn install_app(
        &self,
        organization_uid: &str,
        app_uid: &str,
        request: &InstallRequest,
    ) -> Result<Installation> {
        let response: DataResponse<Installation> = self
            .developer_hub
            .post(
                &format!("manifests/{app_uid}/install"),
                Some(organization_uid),
                request,
            )
            .await?;
        Ok(response.data)
    }

    async fn reinstall_app(
        &self,
        organization_uid: &str,
        app_uid: &str,
        request: &InstallRequest,
    ) -> Result<Installation> {
        let response: DataResponse<Installation> = self
            .developer_hub
            .put(
                &format!("manifests/{app_uid}/reinstall"),
                Some(organization_uid),
                request,
            )
            .await?;
        Ok(response.data)
    }

    async fn uninstall(&self, organization_uid: &str, installation_uid: &str) -> Result<()> {
        let _ignored: Value = self
            .developer_hub
            .delete(
                &format!("installations/{installation_uid}"),
                Some(organization_uid),
            )
            .await?;
        Ok(())
    }

    async fn update_hosting(
        &self,
        organization_uid: &str,
        app_uid: &str,
        payload: &HostingPayload,
    ) -> Result<()> {
        let _ignored: Value = self
            .developer_hub
            .put(
                &format!("manifests/{app_uid}/hosting"),
                Some(organization_uid),
                payload,
            )
            .await?;
        Ok(())
    }

    async fn disconnect_hosting(&self, organization_uid: &str, app_uid: &str) -> Result<()> {
        let _ignored: Value = self
            .developer_hub
            .patch(
                &format!("manifests/{app_uid}/hosting/disconnect"),
                Some(organization_uid),
                DisconnectRequest {
                    provider: HostingProvider::Launch,
                },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LaunchApi for Client {
    async fn list_projects(&self, organization_uid: &str) -> Result<Vec<LaunchProject>> {
        let data: ProjectsData = self
            .graphql(organization_uid, PROJECTS_QUERY, json!({}))
            .await?;
        Ok(data.into_projects())
    }

    async fn create_project(&self, organization_uid: &str, name: &str) -> Result<LaunchProject> {
        let data: CreateProjectData = self
            .graphql(
                organization_uid,
                CREATE_PROJECT_MUTATION,
                json!({ "project": { "name": name } }),
            )
            .await?;
        Ok(data.create_project.into())
    }
}
