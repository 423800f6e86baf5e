use appctl_client::{LaunchApi, MarketplaceApi};
use clap::Parser;
use eyre::Result;
use tracing::info;

use crate::cli::app::install::InstallArgs;
use crate::cli::Environment;
use crate::common::warn_on_error;
use crate::output::InstallOutcome;
use crate::prompt::Prompter;
use crate::resolve::resolve_install_target;

#[derive(Debug, Parser)]
#[command(about = "Reinstall an app to pick up manifest or hosting changes")]
pub struct ReinstallCommand {
    #[command(flatten)]
    pub install: InstallArgs,
}

impl ReinstallCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        let manifest = self.install.args.load_manifest(environment).await?;
        let mut ctx = self.install.context();

        let target = resolve_install_target(environment, &mut ctx, manifest.as_ref()).await?;

        let installation = warn_on_error(
            environment
                .api
                .reinstall_app(
                    &target.organization_uid,
                    &target.app.uid,
                    &target.install_request(),
                )
                .await,
            "failed to reinstall app",
        )?;

        info!(
            app_uid = %target.app.uid,
            installation_uid = %installation.uid,
            "app reinstalled"
        );

        environment.output.write(&InstallOutcome {
            action: "reinstalled",
            app_name: &target.app.name,
            installation: &installation,
        });

        Ok(())
    }
}
