use appctl_client::{ApiError, LaunchApi, MarketplaceApi};
use appctl_primitives::manifest::AppManifest;
use clap::Parser;
use eyre::Result;
use tracing::warn;

use crate::cli::app::AppArgs;
use crate::cli::Environment;
use crate::output::{ErrorLine, InfoLine};
use crate::prompt::Prompter;
use crate::resolve::{confirm, get_app, get_org, AppCandidates, ResolutionContext};

/// A rejected delete is retried with a newly chosen app at most this often.
pub const MAX_DELETE_RETRIES: u8 = 1;

#[derive(Debug, Parser)]
#[command(about = "Delete an app")]
pub struct DeleteCommand {
    #[command(flatten)]
    pub args: AppArgs,
}

impl DeleteCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        let manifest = self.args.load_manifest(environment).await?;
        let mut ctx = self.args.context();

        let organization_uid = get_org(environment, &mut ctx, manifest.as_ref()).await?;
        let deleted = delete_app(
            environment,
            &mut ctx,
            manifest.as_ref(),
            &organization_uid,
            MAX_DELETE_RETRIES,
        )
        .await?;

        environment.output.write(&InfoLine(&format!(
            "App '{}' deleted successfully",
            deleted.name
        )));

        Ok(())
    }
}

/// Resolves the app, confirms and deletes it.
///
/// A 400 answer is reported and, while `retries` (capped at
/// [`MAX_DELETE_RETRIES`]) remain, the app is resolved again without the
/// manifest's UID and the delete repeated.
pub async fn delete_app<A, P>(
    environment: &Environment<A, P>,
    ctx: &mut ResolutionContext,
    manifest: Option<&AppManifest>,
    organization_uid: &str,
    retries: u8,
) -> Result<AppManifest>
where
    A: MarketplaceApi + LaunchApi,
    P: Prompter,
{
    let mut remaining = retries.min(MAX_DELETE_RETRIES);

    loop {
        let app = get_app(
            environment,
            ctx,
            manifest,
            organization_uid,
            AppCandidates::All,
        )
        .await?;

        confirm(
            environment,
            ctx,
            &format!("Are you sure you want to delete '{}'?", app.name),
        )?;

        let err = match environment.api.delete_app(organization_uid, &app.uid).await {
            Ok(()) => return Ok(app),
            Err(err) => err,
        };

        warn!(%err, app_uid = %app.uid, "failed to delete app");

        let bad_request = err
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_bad_request);

        if !bad_request || remaining == 0 {
            return Err(err);
        }

        remaining = remaining.saturating_sub(1);
        environment.output.write(&ErrorLine(&err.to_string()));
        ctx.forget_app();
    }
}
