use appctl_client::{LaunchApi, MarketplaceApi};
use appctl_primitives::manifest::TargetType;
use clap::Parser;
use eyre::Result;

use crate::cli::app::AppArgs;
use crate::cli::Environment;
use crate::manifest_file;
use crate::output::ManifestSaved;
use crate::prompt::Prompter;
use crate::resolve::{get_app, get_org, AppCandidates};

#[derive(Debug, Parser)]
#[command(about = "Fetch an app manifest into the data directory")]
pub struct GetCommand {
    #[command(flatten)]
    pub args: AppArgs,

    /// Only offer apps of this type
    #[arg(long, value_name = "TYPE")]
    pub app_type: Option<TargetType>,

    /// Only offer apps that are installed somewhere
    #[arg(long)]
    pub installed: bool,
}

impl GetCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        let manifest = self.args.load_manifest(environment).await?;
        let mut ctx = self.args.context();
        ctx.app_type_filter = self.app_type;

        let candidates = if self.installed {
            AppCandidates::Installed
        } else {
            AppCandidates::All
        };

        let organization_uid = get_org(environment, &mut ctx, manifest.as_ref()).await?;
        let app = get_app(
            environment,
            &mut ctx,
            manifest.as_ref(),
            &organization_uid,
            candidates,
        )
        .await?;

        let path = manifest_file::save(
            &environment.prompter,
            &self.args.data_dir,
            &environment.config.default_app_file_name,
            &app,
            self.args.yes,
        )
        .await?;

        environment.output.write(&ManifestSaved {
            manifest: &app,
            path,
        });

        Ok(())
    }
}
