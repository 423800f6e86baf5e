use std::collections::HashMap;

use appctl_client::{LaunchApi, MarketplaceApi};
use appctl_primitives::installation::Installation;
use appctl_primitives::manifest::{AppManifest, TargetType};
use clap::Parser;
use eyre::{bail, Result};
use tracing::info;

use crate::cli::app::AppArgs;
use crate::cli::Environment;
use crate::common::{fetch_stacks, warn_on_error};
use crate::output::InfoLine;
use crate::prompt::Prompter;
use crate::resolve::{get_app, get_org, AppCandidates, ResolutionContext};

#[derive(Debug, Parser)]
#[command(about = "Uninstall an app from some or all of its targets")]
pub struct UninstallCommand {
    #[command(flatten)]
    pub args: AppArgs,

    /// Only offer apps of this type
    #[arg(long, value_name = "TYPE")]
    pub app_type: Option<TargetType>,

    /// Installations to remove, comma separated
    #[arg(long, value_name = "UID", value_delimiter = ',', conflicts_with = "uninstall_all")]
    pub installation_uid: Vec<String>,

    /// Remove every installation of the app
    #[arg(long)]
    pub uninstall_all: bool,
}

impl UninstallCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        let manifest = self.args.load_manifest(environment).await?;
        let mut ctx = ResolutionContext {
            app_type_filter: self.app_type,
            installation_uids: self.installation_uid,
            ..self.args.context()
        };

        let organization_uid = get_org(environment, &mut ctx, manifest.as_ref()).await?;
        let app = get_app(
            environment,
            &mut ctx,
            manifest.as_ref(),
            &organization_uid,
            AppCandidates::Installed,
        )
        .await?;

        let strategy = UninstallStrategy::select(self.uninstall_all);
        let installation_uids = strategy
            .installations(environment, &ctx, &organization_uid, &app)
            .await?;

        if installation_uids.is_empty() {
            environment.output.write(&InfoLine(&format!(
                "App '{}' has no installations",
                app.name
            )));
            return Ok(());
        }

        strategy
            .run(environment, &organization_uid, &installation_uids)
            .await?;

        environment.output.write(&InfoLine(&format!(
            "App '{}' uninstalled successfully",
            app.name
        )));

        Ok(())
    }
}

/// Which installations of an app `app uninstall` removes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UninstallStrategy {
    /// Every installation, in server order.
    All,
    /// The `--installation-uid` values, or one installation picked by the user.
    Selected,
}

impl UninstallStrategy {
    #[must_use]
    pub const fn select(uninstall_all: bool) -> Self {
        if uninstall_all {
            Self::All
        } else {
            Self::Selected
        }
    }

    /// UIDs of the installations to remove.
    pub async fn installations<A, P>(
        self,
        environment: &Environment<A, P>,
        ctx: &ResolutionContext,
        organization_uid: &str,
        app: &AppManifest,
    ) -> Result<Vec<String>>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        if self == Self::Selected && !ctx.installation_uids.is_empty() {
            return Ok(ctx.installation_uids.clone());
        }

        let installations = warn_on_error(
            environment
                .api
                .list_installations(organization_uid, &app.uid)
                .await,
            "failed to list installations",
        )?;

        match self {
            Self::All => Ok(installations.into_iter().map(|i| i.uid).collect()),
            Self::Selected if installations.is_empty() => Ok(Vec::new()),
            Self::Selected => {
                let labels =
                    installation_labels(environment, organization_uid, app, &installations).await?;
                let index = environment
                    .prompter
                    .select("Choose an installation", &labels)?;

                match installations.into_iter().nth(index) {
                    Some(installation) => Ok(vec![installation.uid]),
                    None => bail!("Invalid installation selection"),
                }
            }
        }
    }

    /// Uninstalls one after another; the first failure stops the rest.
    pub async fn run<A, P>(
        self,
        environment: &Environment<A, P>,
        organization_uid: &str,
        installation_uids: &[String],
    ) -> Result<()>
    where
        A: MarketplaceApi,
    {
        for installation_uid in installation_uids {
            warn_on_error(
                environment
                    .api
                    .uninstall(organization_uid, installation_uid)
                    .await,
                "failed to uninstall app",
            )?;

            info!(%installation_uid, strategy = ?self, "installation removed");
        }

        Ok(())
    }
}

/// Stack installations are shown by stack name, falling back to the API key.
async fn installation_labels<A, P>(
    environment: &Environment<A, P>,
    organization_uid: &str,
    app: &AppManifest,
    installations: &[Installation],
) -> Result<Vec<String>>
where
    A: MarketplaceApi,
{
    let stack_names = match app.target_type {
        TargetType::Stack => fetch_stacks(&environment.api, organization_uid)
            .await?
            .into_iter()
            .map(|stack| (stack.api_key, stack.name))
            .collect::<HashMap<_, _>>(),
        TargetType::Organization => HashMap::new(),
    };

    Ok(installations
        .iter()
        .map(|installation| {
            let target = &installation.target;
            match stack_names.get(&target.uid) {
                Some(name) => format!("{name} ({})", installation.uid),
                None => format!("{} {} ({})", target.target_type, target.uid, installation.uid),
            }
        })
        .collect())
}
