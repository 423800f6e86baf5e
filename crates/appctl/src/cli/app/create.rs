use appctl_client::{LaunchApi, MarketplaceApi};
use appctl_primitives::manifest::{AppManifest, TargetType};
use clap::Parser;
use eyre::Result;
use tracing::info;

use crate::cli::app::AppArgs;
use crate::cli::validation::{app_name, validate_app_name};
use crate::cli::Environment;
use crate::common::warn_on_error;
use crate::manifest_file;
use crate::output::{ErrorLine, InfoLine, ManifestSaved};
use crate::prompt::Prompter;
use crate::resolve::get_org;

const TARGET_TYPES: [TargetType; 2] = [TargetType::Stack, TargetType::Organization];

#[derive(Debug, Parser)]
#[command(about = "Register a new app in an organization")]
pub struct CreateCommand {
    #[command(flatten)]
    pub args: AppArgs,

    /// Name of the app, 3 to 20 characters
    #[arg(long, short, value_parser = app_name)]
    pub name: Option<String>,

    /// Whether the app is installed into stacks or into the organization
    #[arg(long, value_name = "TYPE")]
    pub app_type: Option<TargetType>,
}

impl CreateCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        let mut ctx = self.args.context();
        let organization_uid = get_org(environment, &mut ctx, None).await?;

        let name = match self.name {
            Some(name) => name,
            None => prompt_name(environment)?,
        };

        let target_type = match self.app_type {
            Some(target_type) => target_type,
            None => prompt_target_type(environment)?,
        };

        let created = warn_on_error(
            environment
                .api
                .create_app(&organization_uid, &AppManifest::new(name, target_type))
                .await,
            "failed to create app",
        )?;

        info!(app_uid = %created.uid, %organization_uid, "app created");

        let path = manifest_file::save(
            &environment.prompter,
            &self.args.data_dir,
            &environment.config.default_app_file_name,
            &created,
            self.args.yes,
        )
        .await?;

        environment.output.write(&InfoLine(&format!(
            "App '{}' created successfully",
            created.name
        )));
        environment.output.write(&ManifestSaved {
            manifest: &created,
            path,
        });

        Ok(())
    }
}

/// Asks until the name passes validation.
fn prompt_name<A, P: Prompter>(environment: &Environment<A, P>) -> Result<String> {
    loop {
        let name = environment
            .prompter
            .text("Enter the app name", Some(&environment.config.default_app_name))?;

        match validate_app_name(&name) {
            Ok(()) => return Ok(name.trim().to_owned()),
            Err(err) => environment.output.write(&ErrorLine(&err.to_string())),
        }
    }
}

fn prompt_target_type<A, P: Prompter>(environment: &Environment<A, P>) -> Result<TargetType> {
    let options = TARGET_TYPES
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let index = environment.prompter.select("Choose the app type", &options)?;

    Ok(TARGET_TYPES.get(index).copied().unwrap_or(TargetType::Stack))
}
