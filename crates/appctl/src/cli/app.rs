use appctl_client::{LaunchApi, MarketplaceApi};
use appctl_primitives::manifest::AppManifest;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use const_format::concatcp;
use eyre::Result;

use crate::cli::Environment;
use crate::defaults;
use crate::manifest_file;
use crate::prompt::Prompter;
use crate::resolve::ResolutionContext;

pub mod create;
pub mod delete;
pub mod deploy;
pub mod get;
pub mod install;
pub mod reinstall;
pub mod uninstall;
pub mod update;

pub const EXAMPLES: &str = r"
  # Create an app in an organization
  $ appctl app create --org <org_uid> --name my-app --app-type stack

  # Fetch an app manifest, choosing among installed apps only
  $ appctl app get --installed

  # Install a stack app without any prompt
  $ appctl app install --org <org_uid> --app-uid <app_uid> --stack-api-key <api_key>

  # Reinstall the app described by ./manifest.json
  $ appctl app reinstall --stack-api-key <api_key>

  # Uninstall every installation of an app
  $ appctl app uninstall --app-uid <app_uid> --uninstall-all

  # Uninstall two specific installations
  $ appctl app uninstall --app-uid <app_uid> --installation-uid <uid1>,<uid2>

  # Host an app at your own URL
  $ appctl app deploy --hosting-type custom-hosting --app-url https://my-app.example.com

  # Push local manifest changes
  $ appctl app update --app-manifest ./manifest.json

  # Delete an app without confirmation
  $ appctl app delete --app-uid <app_uid> --yes
";

#[derive(Debug, Parser)]
#[command(about = "Command for managing marketplace apps")]
#[command(after_help = concatcp!(
    "Examples:",
    EXAMPLES
))]
pub struct AppCommand {
    #[command(subcommand)]
    pub subcommand: AppSubCommands,
}

#[derive(Debug, Subcommand)]
pub enum AppSubCommands {
    Create(create::CreateCommand),
    Get(get::GetCommand),
    Delete(delete::DeleteCommand),
    Deploy(deploy::DeployCommand),
    Install(install::InstallCommand),
    Reinstall(reinstall::ReinstallCommand),
    Uninstall(uninstall::UninstallCommand),
    Update(update::UpdateCommand),
}

impl AppCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        match self.subcommand {
            AppSubCommands::Create(create) => create.run(environment).await,
            AppSubCommands::Get(get) => get.run(environment).await,
            AppSubCommands::Delete(delete) => delete.run(environment).await,
            AppSubCommands::Deploy(deploy) => deploy.run(environment).await,
            AppSubCommands::Install(install) => install.run(environment).await,
            AppSubCommands::Reinstall(reinstall) => reinstall.run(environment).await,
            AppSubCommands::Uninstall(uninstall) => uninstall.run(environment).await,
            AppSubCommands::Update(update) => update.run(environment).await,
        }
    }
}

/// Flags every `app` subcommand accepts.
#[derive(Clone, Debug, Parser)]
pub struct AppArgs {
    /// Organization UID
    #[arg(long, value_name = "ORG_UID")]
    pub org: Option<String>,

    /// App UID
    #[arg(long, value_name = "APP_UID")]
    pub app_uid: Option<String>,

    /// Directory the app manifest is read from and written to
    #[arg(long, value_name = "PATH", default_value_t = defaults::default_data_dir())]
    pub data_dir: Utf8PathBuf,

    /// Answer yes to every confirmation
    #[arg(long, short)]
    pub yes: bool,
}

impl AppArgs {
    pub fn context(&self) -> ResolutionContext {
        ResolutionContext {
            org: self.org.clone(),
            app_uid: self.app_uid.clone(),
            yes: self.yes,
            ..Default::default()
        }
    }

    /// The manifest in the data directory, if there is one.
    pub async fn load_manifest<A, P>(
        &self,
        environment: &Environment<A, P>,
    ) -> Result<Option<AppManifest>> {
        manifest_file::load(&self.data_dir, &environment.config.manifest_file_name()).await
    }
}
