//! Contracts the command-line tool programs against.
//!
//! [`crate::Client`] implements both traits over HTTP; tests substitute
//! in-memory implementations.

use appctl_primitives::api::{InstallRequest, Page};
use appctl_primitives::hosting::{HostingPayload, LaunchProject};
use appctl_primitives::installation::Installation;
use appctl_primitives::manifest::{AppManifest, TargetType};
use appctl_primitives::organization::{Organization, Stack};
use async_trait::async_trait;
use eyre::Result;

/// Organizations and stacks (management API) plus manifests and
/// installations (developer hub).
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Organizations of the current user, ascending by name.
    async fn list_organizations(&self, skip: u64, limit: u64) -> Result<Page<Organization>>;

    /// Stacks of an organization, ascending by name.
    async fn list_stacks(&self, organization_uid: &str, skip: u64, limit: u64)
        -> Result<Page<Stack>>;

    async fn list_apps(
        &self,
        organization_uid: &str,
        target_type: Option<TargetType>,
        skip: u64,
        limit: u64,
    ) -> Result<Page<AppManifest>>;

    async fn get_app(&self, organization_uid: &str, app_uid: &str) -> Result<AppManifest>;

    async fn create_app(&self, organization_uid: &str, manifest: &AppManifest)
        -> Result<AppManifest>;

    async fn update_app(&self, organization_uid: &str, manifest: &AppManifest)
        -> Result<AppManifest>;

    async fn delete_app(&self, organization_uid: &str, app_uid: &str) -> Result<()>;

    /// Installations of one app, in the order the server returns them.
    async fn list_installations(
        &self,
        organization_uid: &str,
        app_uid: &str,
    ) -> Result<Vec<Installation>>;

    async fn install_app(
        &self,
        organization_uid: &str,
        app_uid: &str,
        request: &InstallRequest,
    ) -> Result<Installation>;

    async fn reinstall_app(
        &self,
        organization_uid: &str,
        app_uid: &str,
        request: &InstallRequest,
    ) -> Result<Installation>;

    async fn uninstall(&self, organization_uid: &str, installation_uid: &str) -> Result<()>;

    async fn update_hosting(
        &self,
        organization_uid: &str,
        app_uid: &str,
        payload: &HostingPayload,
    ) -> Result<()>;

    /// Detaches whatever Launch project currently serves `app_uid`.
    async fn disconnect_hosting(&self, organization_uid: &str, app_uid: &str) -> Result<()>;
}

/// The hosting subsystem used by `app deploy`.
#[async_trait]
pub trait LaunchApi: Send + Sync {
    async fn list_projects(&self, organization_uid: &str) -> Result<Vec<LaunchProject>>;

    async fn create_project(&self, organization_uid: &str, name: &str) -> Result<LaunchProject>;
}
