use appctl_client::{LaunchApi, MarketplaceApi};
use appctl_primitives::manifest::TargetType;
use clap::Parser;
use eyre::Result;
use tracing::info;

use crate::cli::app::AppArgs;
use crate::cli::Environment;
use crate::common::warn_on_error;
use crate::output::InstallOutcome;
use crate::prompt::Prompter;
use crate::resolve::{resolve_install_target, ResolutionContext};

/// Flags shared by `app install` and `app reinstall`.
#[derive(Clone, Debug, Parser)]
pub struct InstallArgs {
    #[command(flatten)]
    pub args: AppArgs,

    /// Only offer apps of this type
    #[arg(long, value_name = "TYPE")]
    pub app_type: Option<TargetType>,

    /// API key of the stack to install a stack app into
    #[arg(long, value_name = "API_KEY")]
    pub stack_api_key: Option<String>,
}

impl InstallArgs {
    pub fn context(&self) -> ResolutionContext {
        ResolutionContext {
            app_type_filter: self.app_type,
            stack_api_key: self.stack_api_key.clone(),
            ..self.args.context()
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Install an app into a stack or an organization")]
pub struct InstallCommand {
    #[command(flatten)]
    pub install: InstallArgs,
}

impl InstallCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        let manifest = self.install.args.load_manifest(environment).await?;
        let mut ctx = self.install.context();

        let target = resolve_install_target(environment, &mut ctx, manifest.as_ref()).await?;
        let request = target.install_request();

        let installation = warn_on_error(
            environment
                .api
                .install_app(&target.organization_uid, &target.app.uid, &request)
                .await,
            "failed to install app",
        )?;

        info!(
            app_uid = %target.app.uid,
            installation_uid = %installation.uid,
            "app installed"
        );

        environment.output.write(&InstallOutcome {
            action: "installed",
            app_name: &target.app.name,
            installation: &installation,
        });

        Ok(())
    }
}
