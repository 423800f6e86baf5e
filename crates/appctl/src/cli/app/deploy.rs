use appctl_client::{LaunchApi, MarketplaceApi};
use appctl_primitives::hosting::{HostingPayload, LaunchProject};
use appctl_primitives::manifest::AppManifest;
use clap::{Parser, ValueEnum};
use eyre::{bail, Result};
use tracing::info;
use url::Url;

use crate::cli::app::AppArgs;
use crate::cli::validation::{deployment_url, validate_deployment_url};
use crate::cli::Environment;
use crate::common::warn_on_error;
use crate::output::{ErrorLine, HostingUpdated, WarnLine};
use crate::prompt::Prompter;
use crate::resolve::{confirm, get_app, get_org, AppCandidates, ResolutionContext};

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum HostingType {
    /// The app is served from a URL you host
    CustomHosting,
    /// The app is served by a Launch project
    HostingWithLaunch,
}

impl HostingType {
    const ALL: [Self; 2] = [Self::CustomHosting, Self::HostingWithLaunch];

    const fn label(self) -> &'static str {
        match self {
            Self::CustomHosting => "Custom Hosting",
            Self::HostingWithLaunch => "Hosting with Launch",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LaunchProjectType {
    ExistingProject,
    NewProject,
}

impl LaunchProjectType {
    const ALL: [Self; 2] = [Self::ExistingProject, Self::NewProject];

    const fn label(self) -> &'static str {
        match self {
            Self::ExistingProject => "Existing project",
            Self::NewProject => "New project",
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Point an app's hosting at a custom URL or a Launch project")]
pub struct DeployCommand {
    #[command(flatten)]
    pub args: AppArgs,

    #[arg(long, value_name = "TYPE", value_enum)]
    pub hosting_type: Option<HostingType>,

    /// URL the app is served from
    #[arg(long, value_name = "URL", value_parser = deployment_url)]
    pub app_url: Option<Url>,

    #[arg(long, value_name = "TYPE", value_enum)]
    pub launch_project_type: Option<LaunchProjectType>,
}

impl DeployCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        let manifest = self.args.load_manifest(environment).await?;
        let mut ctx = self.args.context();

        let organization_uid = get_org(environment, &mut ctx, manifest.as_ref()).await?;
        let app = get_app(
            environment,
            &mut ctx,
            manifest.as_ref(),
            &organization_uid,
            AppCandidates::All,
        )
        .await?;

        let hosting_type = match self.hosting_type {
            Some(hosting_type) => hosting_type,
            None => choose(environment, "Choose a hosting type", &HostingType::ALL, HostingType::label)?,
        };

        let payload = match hosting_type {
            HostingType::CustomHosting => {
                HostingPayload::external(app_url(
                    environment,
                    self.app_url.as_ref(),
                    "Enter the app URL",
                )?)
            }
            HostingType::HostingWithLaunch => {
                let launch = LaunchDeployment {
                    environment,
                    ctx: &ctx,
                    organization_uid: &organization_uid,
                    app: &app,
                    app_url: self.app_url.as_ref(),
                };
                launch.payload(self.launch_project_type).await?
            }
        };

        warn_on_error(
            environment
                .api
                .update_hosting(&organization_uid, &app.uid, &payload)
                .await,
            "failed to update hosting",
        )?;

        info!(app_uid = %app.uid, provider = %payload.provider, "hosting updated");

        environment.output.write(&HostingUpdated {
            app_uid: &app.uid,
            hosting: &payload,
        });

        Ok(())
    }
}

fn choose<A, P: Prompter, T: Copy>(
    environment: &Environment<A, P>,
    message: &str,
    options: &[T],
    label: fn(T) -> &'static str,
) -> Result<T> {
    let labels = options
        .iter()
        .map(|option| label(*option).to_owned())
        .collect::<Vec<_>>();
    let index = environment.prompter.select(message, &labels)?;

    match options.get(index) {
        Some(option) => Ok(*option),
        None => bail!("Invalid selection"),
    }
}

/// The `--app-url` value, or a prompted one that passes validation.
fn app_url<A, P: Prompter>(
    environment: &Environment<A, P>,
    flag: Option<&Url>,
    message: &str,
) -> Result<Url> {
    if let Some(url) = flag {
        return Ok(url.clone());
    }

    loop {
        let input = environment.prompter.text(message, None)?;
        match validate_deployment_url(&input) {
            Ok(url) => return Ok(url),
            Err(err) => environment.output.write(&ErrorLine(&err.to_string())),
        }
    }
}

/// First of `name`, `name-1`, `name-2`, … not in `taken`.
#[must_use]
pub fn next_available_project_name(name: &str, taken: &[&str]) -> String {
    if !taken.contains(&name) {
        return name.to_owned();
    }

    (1_u32..)
        .map(|suffix| format!("{name}-{suffix}"))
        .find(|candidate| !taken.contains(&candidate.as_str()))
        .unwrap_or_else(|| name.to_owned())
}

struct LaunchDeployment<'a, A, P> {
    environment: &'a Environment<A, P>,
    ctx: &'a ResolutionContext,
    organization_uid: &'a str,
    app: &'a AppManifest,
    app_url: Option<&'a Url>,
}

impl<A, P> LaunchDeployment<'_, A, P>
where
    A: MarketplaceApi + LaunchApi,
    P: Prompter,
{
    async fn payload(&self, project_type: Option<LaunchProjectType>) -> Result<HostingPayload> {
        let project_type = match project_type {
            Some(project_type) => project_type,
            None => choose(
                self.environment,
                "Choose a Launch project type",
                &LaunchProjectType::ALL,
                LaunchProjectType::label,
            )?,
        };

        let projects = warn_on_error(
            self.environment
                .api
                .list_projects(self.organization_uid)
                .await,
            "failed to list Launch projects",
        )?;

        let project = match project_type {
            LaunchProjectType::ExistingProject if projects.is_empty() => {
                self.environment.output.write(&WarnLine(
                    "No Launch projects found, a new project will be created",
                ));
                self.new_project(&projects).await?
            }
            LaunchProjectType::ExistingProject => self.existing_project(projects).await?,
            LaunchProjectType::NewProject => self.new_project(&projects).await?,
        };

        let Some(environment_uid) = project.environment_uid.clone() else {
            bail!("Launch project '{}' has no environment", project.name);
        };

        // New projects have no deployment until the first Launch build.
        let url = match &project.deployment_url {
            Some(url) => url.clone(),
            None => app_url(
                self.environment,
                self.app_url,
                &format!("Enter the Launch deployment URL of '{}'", project.name),
            )?,
        };

        Ok(HostingPayload::launch(url, environment_uid, project.uid))
    }

    async fn existing_project(&self, projects: Vec<LaunchProject>) -> Result<LaunchProject> {
        let names = projects
            .iter()
            .map(|project| project.name.clone())
            .collect::<Vec<_>>();
        let index = self
            .environment
            .prompter
            .select("Choose a Launch project", &names)?;

        let Some(project) = projects.into_iter().nth(index) else {
            bail!("Invalid Launch project selection");
        };

        if let Some(linked_app_uid) = project.linked_to_other_app(&self.app.uid) {
            confirm(
                self.environment,
                self.ctx,
                &format!(
                    "Launch project '{}' is linked to another app ({linked_app_uid}). Disconnect it and link it to '{}'?",
                    project.name, self.app.name
                ),
            )?;

            warn_on_error(
                self.environment
                    .api
                    .disconnect_hosting(self.organization_uid, linked_app_uid)
                    .await,
                "failed to disconnect Launch project",
            )?;

            info!(project_uid = %project.uid, %linked_app_uid, "Launch project disconnected");
        }

        Ok(project)
    }

    async fn new_project(&self, existing: &[LaunchProject]) -> Result<LaunchProject> {
        let name = self
            .environment
            .prompter
            .text("Enter the Launch project name", Some(&self.app.name))?;
        let name = match name.trim() {
            "" => self.app.name.clone(),
            name => name.to_owned(),
        };

        let taken = existing
            .iter()
            .map(|project| project.name.as_str())
            .collect::<Vec<_>>();
        let name = next_available_project_name(&name, &taken);

        let project = warn_on_error(
            self.environment
                .api
                .create_project(self.organization_uid, &name)
                .await,
            "failed to create Launch project",
        )?;

        info!(project_uid = %project.uid, project_name = %project.name, "Launch project created");

        Ok(project)
    }
}
