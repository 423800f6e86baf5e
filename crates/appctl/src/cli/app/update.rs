use appctl_client::{LaunchApi, MarketplaceApi};
use camino::Utf8PathBuf;
use clap::Parser;
use eyre::{bail, Result};
use tracing::info;

use crate::cli::app::AppArgs;
use crate::cli::validation::validate_file_exists;
use crate::cli::Environment;
use crate::common::warn_on_error;
use crate::manifest_file;
use crate::output::ManifestSaved;
use crate::prompt::Prompter;
use crate::resolve::get_org;

#[derive(Debug, Parser)]
#[command(about = "Push local manifest changes to the developer hub")]
pub struct UpdateCommand {
    #[command(flatten)]
    pub args: AppArgs,

    /// Path of the manifest to push
    #[arg(long, value_name = "PATH")]
    pub app_manifest: Option<Utf8PathBuf>,
}

impl UpdateCommand {
    pub async fn run<A, P>(self, environment: &Environment<A, P>) -> Result<()>
    where
        A: MarketplaceApi + LaunchApi,
        P: Prompter,
    {
        let path = match self.app_manifest {
            Some(path) => path,
            None => {
                let default = self.args.data_dir.join(environment.config.manifest_file_name());
                Utf8PathBuf::from(
                    environment
                        .prompter
                        .text("Enter the path of the app manifest", Some(default.as_str()))?,
                )
            }
        };

        validate_file_exists(&path)?;
        let manifest = manifest_file::read(&path).await?;

        let Some(app_uid) = manifest.uid() else {
            bail!("The manifest at '{path}' has no app uid. Run `appctl app get` to fetch the app manifest first");
        };

        let mut ctx = self.args.context();
        let organization_uid = get_org(environment, &mut ctx, Some(&manifest)).await?;

        let remote = warn_on_error(
            environment.api.get_app(&organization_uid, app_uid).await,
            "failed to fetch app",
        )?;

        if remote.version != manifest.version {
            bail!(
                "The manifest at '{path}' is at version {} but the app is at version {}. Run `appctl app get` to fetch the latest manifest",
                version(manifest.version),
                version(remote.version),
            );
        }

        let updated = warn_on_error(
            environment
                .api
                .update_app(&organization_uid, &manifest)
                .await,
            "failed to update app",
        )?;

        info!(%app_uid, version = ?updated.version, "app updated");

        manifest_file::write(&path, &updated).await?;

        environment.output.write(&ManifestSaved {
            manifest: &updated,
            path,
        });

        Ok(())
    }
}

fn version(version: Option<u64>) -> String {
    version.map_or_else(|| "unknown".to_owned(), |version| version.to_string())
}

#[cfg(test)]
mod tests {
    use appctl_primitives::manifest::TargetType;

    use super::*;
    use crate::testing::{app, environment, Answer, FakeApi};

    async fn manifest_at(version: u64) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("manifest.json")).unwrap();
        let mut manifest = app("a1", "Local", TargetType::Stack);
        manifest.version = Some(version);
        manifest_file::write(&path, &manifest).await.unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_update_writes_server_copy_back() {
        let (_guard, path) = manifest_at(1).await;
        let env = environment(
            FakeApi::default().with_apps(vec![app("a1", "Remote", TargetType::Stack)]),
            vec![],
        );

        let command =
            UpdateCommand::try_parse_from(["update", "--app-manifest", path.as_str()]).unwrap();
        command.run(&env).await.unwrap();

        let saved = manifest_file::read(&path).await.unwrap();
        assert_eq!(saved.name, "Local");
        assert_eq!(saved.version, Some(2));
        assert_eq!(env.api.calls(), vec!["get_app a1", "update_app a1"]);
    }

    #[tokio::test]
    async fn test_version_mismatch_is_rejected() {
        let (_guard, path) = manifest_at(3).await;
        let env = environment(
            FakeApi::default().with_apps(vec![app("a1", "Remote", TargetType::Stack)]),
            vec![],
        );

        let command =
            UpdateCommand::try_parse_from(["update", "--app-manifest", path.as_str()]).unwrap();
        let err = command.run(&env).await.unwrap_err();

        assert!(err.to_string().contains("appctl app get"));
        assert!(env.api.calls_to("update_app").is_empty());
    }

    #[tokio::test]
    async fn test_prompted_path_is_used() {
        let (_guard, path) = manifest_at(1).await;
        let env = environment(
            FakeApi::default().with_apps(vec![app("a1", "Remote", TargetType::Stack)]),
            vec![Answer::Text(path.to_string())],
        );

        let command = UpdateCommand::try_parse_from(["update"]).unwrap();
        command.run(&env).await.unwrap();

        assert_eq!(env.prompter.asked(), vec!["Enter the path of the app manifest"]);
    }

    #[tokio::test]
    async fn test_manifest_without_uid_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("manifest.json")).unwrap();
        manifest_file::write(&path, &app("", "Draft", TargetType::Stack))
            .await
            .unwrap();
        let env = environment(FakeApi::default(), vec![]);

        let command =
            UpdateCommand::try_parse_from(["update", "--app-manifest", path.as_str()]).unwrap();

        assert!(command.run(&env).await.is_err());
        assert!(env.api.calls().is_empty());
    }
}
