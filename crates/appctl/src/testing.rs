//! In-memory stand-ins for the remote services and the terminal.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use appctl_client::{ApiError, LaunchApi, MarketplaceApi};
use appctl_primitives::api::{InstallRequest, Page};
use appctl_primitives::hosting::{HostingPayload, LaunchProject};
use appctl_primitives::installation::Installation;
use appctl_primitives::manifest::{AppManifest, TargetType};
use appctl_primitives::organization::{Organization, Stack};
use async_trait::async_trait;
use eyre::{bail, Result as EyreResult};

use crate::cli::Environment;
use crate::config::Config;
use crate::output::{Format, Output};
use crate::prompt::Prompter;

pub(crate) fn app(uid: &str, name: &str, target_type: TargetType) -> AppManifest {
    let mut app = AppManifest::new(name.to_owned(), target_type);
    app.uid = uid.to_owned();
    app.version = Some(1);
    app.organization_uid = Some("org1".to_owned());
    app
}

pub(crate) fn org(uid: &str, name: &str) -> Organization {
    Organization::new(uid, name)
}

pub(crate) fn stack(api_key: &str, name: &str) -> Stack {
    Stack::new(api_key, name)
}

pub(crate) fn installation(uid: &str, target_type: TargetType, target_uid: &str) -> Installation {
    Installation::new(uid.to_owned(), target_type, target_uid.to_owned())
}

pub(crate) fn project(uid: &str, name: &str, linked_app: Option<&str>) -> LaunchProject {
    LaunchProject {
        uid: uid.to_owned(),
        name: name.to_owned(),
        developer_hub_app_uid: linked_app.map(ToOwned::to_owned),
        environment_uid: Some(format!("env-{uid}")),
        deployment_url: format!("https://{uid}.launch.test").parse().ok(),
    }
}

pub(crate) fn environment(api: FakeApi, answers: Vec<Answer>) -> Environment<FakeApi, ScriptedPrompter> {
    Environment::new(
        Output::new(Format::PlainText),
        Config::default(),
        api,
        ScriptedPrompter::new(answers),
    )
}

fn page<T: Clone>(items: &[T], skip: u64, limit: u64, reported: Option<u64>) -> Page<T> {
    let start = usize::try_from(skip).unwrap_or(usize::MAX).min(items.len());
    let end = usize::try_from(skip.saturating_add(limit))
        .unwrap_or(usize::MAX)
        .min(items.len());
    Page::new(
        items[start..end].to_vec(),
        Some(reported.unwrap_or(items.len() as u64)),
    )
}

fn api_error(status_code: u16, message: &str) -> eyre::Report {
    ApiError {
        status_code,
        message: message.to_owned(),
    }
    .into()
}

/// Records every call as `"<method> <args>"` and answers from fixed data.
#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    organizations: Vec<Organization>,
    stacks: Vec<Stack>,
    apps: Vec<AppManifest>,
    installations: HashMap<String, Vec<Installation>>,
    reported_count: Option<u64>,
    failing_installation_lists: Vec<String>,
    failing_uninstalls: Vec<String>,
    delete_statuses: Mutex<VecDeque<u16>>,
    projects: Mutex<Vec<LaunchProject>>,
    hosting: Mutex<Vec<HostingPayload>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeApi {
    pub(crate) fn with_organizations(mut self, organizations: Vec<Organization>) -> Self {
        self.organizations = organizations;
        self
    }

    pub(crate) fn with_stacks(mut self, stacks: Vec<Stack>) -> Self {
        self.stacks = stacks;
        self
    }

    pub(crate) fn with_apps(mut self, apps: Vec<AppManifest>) -> Self {
        self.apps = apps;
        self
    }

    pub(crate) fn with_installations(mut self, app_uid: &str, installations: Vec<Installation>) -> Self {
        let _previous = self.installations.insert(app_uid.to_owned(), installations);
        self
    }

    /// Reports `count` as the list total regardless of the real size.
    pub(crate) fn with_reported_count(mut self, count: u64) -> Self {
        self.reported_count = Some(count);
        self
    }

    pub(crate) fn with_failing_installation_list(mut self, app_uid: &str) -> Self {
        self.failing_installation_lists.push(app_uid.to_owned());
        self
    }

    pub(crate) fn with_failing_uninstall(mut self, installation_uid: &str) -> Self {
        self.failing_uninstalls.push(installation_uid.to_owned());
        self
    }

    /// Each `delete_app` call answers with the next status; 200 when drained.
    pub(crate) fn with_delete_statuses(self, statuses: Vec<u16>) -> Self {
        *self.delete_statuses.lock().unwrap() = statuses.into();
        self
    }

    pub(crate) fn with_projects(self, projects: Vec<LaunchProject>) -> Self {
        *self.projects.lock().unwrap() = projects;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.split(' ').next() == Some(method))
            .collect()
    }

    pub(crate) fn hosting_updates(&self) -> Vec<HostingPayload> {
        self.hosting.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn find_app(&self, app_uid: &str) -> EyreResult<AppManifest> {
        match self.apps.iter().find(|app| app.uid == app_uid) {
            Some(app) => Ok(app.clone()),
            None => Err(api_error(404, "App not found")),
        }
    }
}

#[async_trait]
impl MarketplaceApi for FakeApi {
    async fn list_organizations(&self, skip: u64, limit: u64) -> EyreResult<Page<Organization>> {
        self.record(format!("list_organizations skip={skip} limit={limit}"));
        Ok(page(&self.organizations, skip, limit, self.reported_count))
    }

    async fn list_stacks(
        &self,
        _organization_uid: &str,
        skip: u64,
        limit: u64,
    ) -> EyreResult<Page<Stack>> {
        self.record(format!("list_stacks skip={skip} limit={limit}"));
        Ok(page(&self.stacks, skip, limit, None))
    }

    async fn list_apps(
        &self,
        _organization_uid: &str,
        target_type: Option<TargetType>,
        skip: u64,
        limit: u64,
    ) -> EyreResult<Page<AppManifest>> {
        self.record(format!("list_apps skip={skip} limit={limit}"));
        let apps = self
            .apps
            .iter()
            .filter(|app| target_type.map_or(true, |target| app.target_type == target))
            .cloned()
            .collect::<Vec<_>>();
        Ok(page(&apps, skip, limit, None))
    }

    async fn get_app(&self, _organization_uid: &str, app_uid: &str) -> EyreResult<AppManifest> {
        self.record(format!("get_app {app_uid}"));
        self.find_app(app_uid)
    }

    async fn create_app(
        &self,
        organization_uid: &str,
        manifest: &AppManifest,
    ) -> EyreResult<AppManifest> {
        self.record(format!("create_app {}", manifest.name));
        let mut created = manifest.clone();
        created.uid = "created-app".to_owned();
        created.version = Some(1);
        created.organization_uid = Some(organization_uid.to_owned());
        Ok(created)
    }

    async fn update_app(
        &self,
        _organization_uid: &str,
        manifest: &AppManifest,
    ) -> EyreResult<AppManifest> {
        self.record(format!("update_app {}", manifest.uid));
        let mut updated = manifest.clone();
        updated.version = manifest.version.map(|version| version + 1);
        Ok(updated)
    }

    async fn delete_app(&self, _organization_uid: &str, app_uid: &str) -> EyreResult<()> {
        self.record(format!("delete_app {app_uid}"));
        match self.delete_statuses.lock().unwrap().pop_front() {
            Some(status) if status >= 400 => Err(api_error(status, "App could not be deleted")),
            _ => Ok(()),
        }
    }

    async fn list_installations(
        &self,
        _organization_uid: &str,
        app_uid: &str,
    ) -> EyreResult<Vec<Installation>> {
        self.record(format!("list_installations {app_uid}"));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _previous = self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let _previous = self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_installation_lists.iter().any(|uid| uid == app_uid) {
            return Err(api_error(500, "Installations unavailable"));
        }

        Ok(self.installations.get(app_uid).cloned().unwrap_or_default())
    }

    async fn install_app(
        &self,
        _organization_uid: &str,
        app_uid: &str,
        request: &InstallRequest,
    ) -> EyreResult<Installation> {
        self.record(format!(
            "install_app {app_uid} {} {}",
            request.target_type, request.target_uid
        ));
        Ok(installation(
            &format!("i-{app_uid}"),
            request.target_type,
            &request.target_uid,
        ))
    }

    async fn reinstall_app(
        &self,
        _organization_uid: &str,
        app_uid: &str,
        request: &InstallRequest,
    ) -> EyreResult<Installation> {
        self.record(format!(
            "reinstall_app {app_uid} {} {}",
            request.target_type, request.target_uid
        ));
        Ok(installation(
            &format!("i-{app_uid}"),
            request.target_type,
            &request.target_uid,
        ))
    }

    async fn uninstall(&self, _organization_uid: &str, installation_uid: &str) -> EyreResult<()> {
        self.record(format!("uninstall {installation_uid}"));
        if self.failing_uninstalls.iter().any(|uid| uid == installation_uid) {
            return Err(api_error(500, "Uninstall failed"));
        }
        Ok(())
    }

    async fn update_hosting(
        &self,
        _organization_uid: &str,
        app_uid: &str,
        payload: &HostingPayload,
    ) -> EyreResult<()> {
        self.record(format!("update_hosting {app_uid} {}", payload.provider));
        self.hosting.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn disconnect_hosting(&self, _organization_uid: &str, app_uid: &str) -> EyreResult<()> {
        self.record(format!("disconnect_hosting {app_uid}"));
        Ok(())
    }
}

#[async_trait]
impl LaunchApi for FakeApi {
    async fn list_projects(&self, _organization_uid: &str) -> EyreResult<Vec<LaunchProject>> {
        self.record("list_projects".to_owned());
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn create_project(&self, _organization_uid: &str, name: &str) -> EyreResult<LaunchProject> {
        self.record(format!("create_project {name}"));
        let mut projects = self.projects.lock().unwrap();
        // A freshly created project has not deployed anything yet.
        let created = LaunchProject {
            deployment_url: None,
            ..project(&format!("p{}", projects.len() + 1), name, None)
        };
        projects.push(created.clone());
        Ok(created)
    }
}

/// A scripted answer to the next prompt.
#[derive(Clone, Debug)]
pub(crate) enum Answer {
    Select(usize),
    Confirm(bool),
    Text(String),
}

/// Answers prompts from a queue and remembers what was asked.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub(crate) fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: Mutex::default(),
        }
    }

    pub(crate) fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.asked.lock().unwrap().len()
    }

    fn next(&self, message: &str) -> EyreResult<Answer> {
        self.asked.lock().unwrap().push(message.to_owned());
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("unexpected prompt: {message}"),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, message: &str, options: &[String]) -> EyreResult<usize> {
        match self.next(message)? {
            Answer::Select(index) if index < options.len() => Ok(index),
            answer => bail!("unexpected answer {answer:?} to: {message}"),
        }
    }

    fn confirm(&self, message: &str, _default: bool) -> EyreResult<bool> {
        match self.next(message)? {
            Answer::Confirm(answer) => Ok(answer),
            answer => bail!("unexpected answer {answer:?} to: {message}"),
        }
    }

    fn text(&self, message: &str, _default: Option<&str>) -> EyreResult<String> {
        match self.next(message)? {
            Answer::Text(answer) => Ok(answer),
            answer => bail!("unexpected answer {answer:?} to: {message}"),
        }
    }
}
