//! Resolution of the organization, app and stack a command operates on.
//!
//! Every identifier is taken from the first source that has it, in order:
//! the local manifest, then the command-line flag, then a remote listing the
//! user picks from. Each step writes what it resolved back into the
//! [`ResolutionContext`] so later steps never resolve it again.

use appctl_client::{LaunchApi, MarketplaceApi};
use appctl_primitives::api::InstallRequest;
use appctl_primitives::manifest::{AppManifest, TargetType};
use appctl_primitives::organization::Organization;
use eyre::{bail, Result as EyreResult};

use crate::cli::Environment;
use crate::common::{
    fetch_apps, fetch_installed_apps, fetch_organizations, fetch_stacks, warn_on_error,
};
use crate::errors::UserTermination;
use crate::output::{ErrorLine, WarnLine};
use crate::prompt::Prompter;

/// Identifiers gathered while a command runs.
///
/// | field | set from flags | written by |
/// |---|---|---|
/// | `org` | `--org` | [`get_org`] |
/// | `app_uid`, `app_type` | `--app-uid` | [`get_app`] |
/// | `app_type_filter` | `--app-type` | never |
/// | `stack_api_key` | `--stack-api-key` | [`get_stack`] |
/// | `installation_uids` | `--installation-uid` | never |
#[derive(Clone, Debug, Default)]
pub struct ResolutionContext {
    pub org: Option<String>,
    pub app_uid: Option<String>,
    pub app_type: Option<TargetType>,
    pub app_type_filter: Option<TargetType>,
    pub stack_api_key: Option<String>,
    pub installation_uids: Vec<String>,
    /// Answer yes to every confirmation.
    pub yes: bool,
    pub(crate) ignore_manifest_uid: bool,
}

impl ResolutionContext {
    /// Forgets the resolved app so the next [`get_app`] asks again, without
    /// falling back to the manifest's `uid`.
    pub fn forget_app(&mut self) {
        self.app_uid = None;
        self.app_type = None;
        self.ignore_manifest_uid = true;
    }
}

/// Where a locally available value came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    Manifest,
    Flag,
}

/// Outcome of one source in a precedence chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Lookup {
    Resolved(String, Origin),
    Delegate,
}

pub type LocalSource = fn(&ResolutionContext, Option<&AppManifest>) -> Lookup;

pub fn app_uid_from_manifest(ctx: &ResolutionContext, manifest: Option<&AppManifest>) -> Lookup {
    match manifest.and_then(AppManifest::uid) {
        Some(uid) if !ctx.ignore_manifest_uid => Lookup::Resolved(uid.to_owned(), Origin::Manifest),
        _ => Lookup::Delegate,
    }
}

pub fn app_uid_from_flag(ctx: &ResolutionContext, _: Option<&AppManifest>) -> Lookup {
    ctx.app_uid
        .as_deref()
        .filter(|uid| !uid.is_empty())
        .map_or(Lookup::Delegate, |uid| {
            Lookup::Resolved(uid.to_owned(), Origin::Flag)
        })
}

pub fn org_from_manifest(_: &ResolutionContext, manifest: Option<&AppManifest>) -> Lookup {
    manifest
        .and_then(AppManifest::organization_uid)
        .map_or(Lookup::Delegate, |uid| {
            Lookup::Resolved(uid.to_owned(), Origin::Manifest)
        })
}

pub fn org_from_flag(ctx: &ResolutionContext, _: Option<&AppManifest>) -> Lookup {
    ctx.org
        .as_deref()
        .filter(|uid| !uid.is_empty())
        .map_or(Lookup::Delegate, |uid| {
            Lookup::Resolved(uid.to_owned(), Origin::Flag)
        })
}

pub const APP_UID_SOURCES: [LocalSource; 2] = [app_uid_from_manifest, app_uid_from_flag];

pub const ORG_SOURCES: [LocalSource; 2] = [org_from_manifest, org_from_flag];

/// Runs `sources` in order and stops at the first that resolves.
pub fn first_resolved(
    sources: &[LocalSource],
    ctx: &ResolutionContext,
    manifest: Option<&AppManifest>,
) -> Lookup {
    sources
        .iter()
        .map(|source| source(ctx, manifest))
        .find(|lookup| matches!(lookup, Lookup::Resolved(..)))
        .unwrap_or(Lookup::Delegate)
}

/// Which apps the interactive picker offers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppCandidates {
    All,
    /// Only apps with at least one installation.
    Installed,
}

/// Asks for confirmation unless `--yes` was given; a "no" aborts the command.
pub fn confirm<A, P: Prompter>(
    environment: &Environment<A, P>,
    ctx: &ResolutionContext,
    message: &str,
) -> EyreResult<()> {
    if ctx.yes || environment.prompter.confirm(message, false)? {
        return Ok(());
    }

    bail!(UserTermination)
}

/// Resolves the organization UID.
///
/// Reads `org`; writes `org`. A manifest value is trusted as is, a flag value
/// must name one of the user's organizations.
pub async fn get_org<A, P>(
    environment: &Environment<A, P>,
    ctx: &mut ResolutionContext,
    manifest: Option<&AppManifest>,
) -> EyreResult<String>
where
    A: MarketplaceApi + LaunchApi,
    P: Prompter,
{
    let lookup = first_resolved(&ORG_SOURCES, ctx, manifest);

    let organization_uid = match lookup {
        Lookup::Resolved(uid, Origin::Manifest) => uid,
        Lookup::Resolved(uid, Origin::Flag) => {
            let organizations = fetch_organizations(&environment.api).await?;

            if organizations.iter().any(|org| org.uid == uid) {
                uid
            } else {
                environment
                    .output
                    .write(&ErrorLine("Organization UID not found!"));
                select_org(environment, organizations)?
            }
        }
        Lookup::Delegate => {
            let organizations = fetch_organizations(&environment.api).await?;
            select_org(environment, organizations)?
        }
    };

    ctx.org = Some(organization_uid.clone());

    Ok(organization_uid)
}

fn select_org<A, P: Prompter>(
    environment: &Environment<A, P>,
    organizations: Vec<Organization>,
) -> EyreResult<String> {
    if organizations.is_empty() {
        bail!("No organizations found for the current user");
    }

    let names = organizations
        .iter()
        .map(|org| org.name.clone())
        .collect::<Vec<_>>();
    let index = environment.prompter.select("Choose an organization", &names)?;

    match organizations.into_iter().nth(index) {
        Some(org) => Ok(org.uid),
        None => bail!("Invalid organization selection"),
    }
}

/// Resolves the app and fetches its manifest.
///
/// Reads `app_uid`, `app_type_filter`; writes `app_uid`, `app_type`.
pub async fn get_app<A, P>(
    environment: &Environment<A, P>,
    ctx: &mut ResolutionContext,
    manifest: Option<&AppManifest>,
    organization_uid: &str,
    candidates: AppCandidates,
) -> EyreResult<AppManifest>
where
    A: MarketplaceApi + LaunchApi,
    P: Prompter,
{
    let app = match first_resolved(&APP_UID_SOURCES, ctx, manifest) {
        Lookup::Resolved(uid, _) => warn_on_error(
            environment.api.get_app(organization_uid, &uid).await,
            "failed to fetch app",
        )?,
        Lookup::Delegate => {
            let apps = match candidates {
                AppCandidates::All => {
                    fetch_apps(&environment.api, organization_uid, ctx.app_type_filter).await?
                }
                AppCandidates::Installed => {
                    fetch_installed_apps(&environment.api, organization_uid, ctx.app_type_filter)
                        .await?
                }
            };
            select_app(environment, apps, candidates)?
        }
    };

    ctx.app_uid = Some(app.uid.clone());
    ctx.app_type = Some(app.target_type);

    Ok(app)
}

fn select_app<A, P: Prompter>(
    environment: &Environment<A, P>,
    apps: Vec<AppManifest>,
    candidates: AppCandidates,
) -> EyreResult<AppManifest> {
    if apps.is_empty() {
        match candidates {
            AppCandidates::All => bail!("No apps found in this organization"),
            AppCandidates::Installed => bail!("No installed apps found in this organization"),
        }
    }

    let names = apps.iter().map(|app| app.name.clone()).collect::<Vec<_>>();
    let index = environment.prompter.select("Choose an app", &names)?;

    match apps.into_iter().nth(index) {
        Some(app) => Ok(app),
        None => bail!("Invalid app selection"),
    }
}

/// Resolves the stack API key.
///
/// Reads `stack_api_key`; writes `stack_api_key`.
pub async fn get_stack<A, P>(
    environment: &Environment<A, P>,
    ctx: &mut ResolutionContext,
    organization_uid: &str,
) -> EyreResult<String>
where
    A: MarketplaceApi + LaunchApi,
    P: Prompter,
{
    if let Some(api_key) = ctx.stack_api_key.as_deref().filter(|key| !key.is_empty()) {
        return Ok(api_key.to_owned());
    }

    let stacks = fetch_stacks(&environment.api, organization_uid).await?;

    if stacks.is_empty() {
        bail!("No stacks found in this organization");
    }

    let names = stacks
        .iter()
        .map(|stack| stack.name.clone())
        .collect::<Vec<_>>();
    let index = environment.prompter.select("Choose a stack", &names)?;

    let Some(stack) = stacks.into_iter().nth(index) else {
        bail!("Invalid stack selection");
    };

    ctx.stack_api_key = Some(stack.api_key.clone());

    Ok(stack.api_key)
}

/// Everything `app install` / `app reinstall` need.
#[derive(Clone, Debug)]
pub struct ResolvedTarget {
    pub organization_uid: String,
    pub app: AppManifest,
    pub app_type: TargetType,
    pub stack_api_key: Option<String>,
}

impl ResolvedTarget {
    /// Organization apps always target the organization, stack apps their stack.
    #[must_use]
    pub fn install_request(&self) -> InstallRequest {
        match (self.app_type, &self.stack_api_key) {
            (TargetType::Stack, Some(api_key)) => {
                InstallRequest::new(TargetType::Stack, api_key.clone())
            }
            _ => InstallRequest::new(TargetType::Organization, self.organization_uid.clone()),
        }
    }
}

/// Resolves organization, app and, for stack apps, the stack.
pub async fn resolve_install_target<A, P>(
    environment: &Environment<A, P>,
    ctx: &mut ResolutionContext,
    manifest: Option<&AppManifest>,
) -> EyreResult<ResolvedTarget>
where
    A: MarketplaceApi + LaunchApi,
    P: Prompter,
{
    let organization_uid = get_org(environment, ctx, manifest).await?;
    let app = get_app(environment, ctx, manifest, &organization_uid, AppCandidates::All).await?;
    let app_type = app.target_type;

    match app_type {
        TargetType::Organization if ctx.stack_api_key.is_some() => {
            confirm(
                environment,
                ctx,
                &format!(
                    "'{}' is an organization app: it will be installed for the whole organization, not the given stack. Continue?",
                    app.name
                ),
            )?;
        }
        TargetType::Stack if ctx.stack_api_key.is_none() => {
            environment.output.write(&WarnLine(
                "This is a stack app and no stack API key was given, please choose a stack",
            ));
            let _api_key = get_stack(environment, ctx, &organization_uid).await?;
        }
        TargetType::Organization | TargetType::Stack => {}
    }

    Ok(ResolvedTarget {
        organization_uid,
        app,
        app_type,
        stack_api_key: ctx.stack_api_key.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{app, environment, org, stack, Answer, FakeApi};

    fn manifest(uid: &str, org_uid: &str) -> AppManifest {
        let mut manifest = app(uid, "From manifest", TargetType::Stack);
        manifest.organization_uid = Some(org_uid.to_owned());
        manifest
    }

    #[test]
    fn test_manifest_wins_over_flag() {
        let ctx = ResolutionContext {
            app_uid: Some("flag-app".to_owned()),
            org: Some("flag-org".to_owned()),
            ..Default::default()
        };
        let manifest = manifest("manifest-app", "manifest-org");

        assert_eq!(
            first_resolved(&APP_UID_SOURCES, &ctx, Some(&manifest)),
            Lookup::Resolved("manifest-app".to_owned(), Origin::Manifest)
        );
        assert_eq!(
            first_resolved(&ORG_SOURCES, &ctx, Some(&manifest)),
            Lookup::Resolved("manifest-org".to_owned(), Origin::Manifest)
        );
    }

    #[test]
    fn test_flag_used_without_manifest() {
        let ctx = ResolutionContext {
            app_uid: Some("flag-app".to_owned()),
            ..Default::default()
        };

        assert_eq!(
            first_resolved(&APP_UID_SOURCES, &ctx, None),
            Lookup::Resolved("flag-app".to_owned(), Origin::Flag)
        );
        assert_eq!(first_resolved(&ORG_SOURCES, &ctx, None), Lookup::Delegate);
    }

    #[test]
    fn test_forgotten_app_skips_manifest_uid() {
        let mut ctx = ResolutionContext {
            app_uid: Some("flag-app".to_owned()),
            ..Default::default()
        };
        ctx.forget_app();

        assert_eq!(
            first_resolved(&APP_UID_SOURCES, &ctx, Some(&manifest("m", "o"))),
            Lookup::Delegate
        );
    }

    #[tokio::test]
    async fn test_unknown_org_flag_falls_back_to_prompt() {
        let api = FakeApi::default().with_organizations(vec![org("org1", "A"), org("org2", "B")]);
        let env = environment(api, vec![Answer::Select(1)]);
        let mut ctx = ResolutionContext {
            org: Some("org3".to_owned()),
            ..Default::default()
        };

        let resolved = get_org(&env, &mut ctx, None).await.unwrap();

        assert_eq!(resolved, "org2");
        assert_eq!(ctx.org.as_deref(), Some("org2"));
        assert_eq!(env.prompter.asked(), vec!["Choose an organization"]);
    }

    #[tokio::test]
    async fn test_known_org_flag_is_not_prompted() {
        let api = FakeApi::default().with_organizations(vec![org("org1", "A"), org("org2", "B")]);
        let env = environment(api, vec![]);
        let mut ctx = ResolutionContext {
            org: Some("org1".to_owned()),
            ..Default::default()
        };

        assert_eq!(get_org(&env, &mut ctx, None).await.unwrap(), "org1");
        assert_eq!(env.prompter.count(), 0);
    }

    #[tokio::test]
    async fn test_manifest_org_skips_remote_listing() {
        let env = environment(FakeApi::default(), vec![]);
        let mut ctx = ResolutionContext::default();

        let resolved = get_org(&env, &mut ctx, Some(&manifest("a1", "org7")))
            .await
            .unwrap();

        assert_eq!(resolved, "org7");
        assert!(env.api.calls().is_empty(), "no remote call expected");
    }

    #[tokio::test]
    async fn test_app_uid_fetches_single_app() {
        let api = FakeApi::default().with_apps(vec![
            app("a1", "Org app", TargetType::Organization),
            app("a2", "Stack app", TargetType::Stack),
        ]);
        let env = environment(api, vec![]);
        let mut ctx = ResolutionContext {
            app_uid: Some("a2".to_owned()),
            ..Default::default()
        };

        let resolved = get_app(&env, &mut ctx, None, "org1", AppCandidates::All)
            .await
            .unwrap();

        assert_eq!(resolved.uid, "a2");
        assert_eq!(ctx.app_type, Some(TargetType::Stack));
        assert_eq!(env.api.calls(), vec!["get_app a2"]);
    }

    #[tokio::test]
    async fn test_app_picker_respects_type_filter() {
        let api = FakeApi::default().with_apps(vec![
            app("a1", "Org app", TargetType::Organization),
            app("a2", "Stack app", TargetType::Stack),
            app("a3", "Other stack app", TargetType::Stack),
        ]);
        let env = environment(api, vec![Answer::Select(1)]);
        let mut ctx = ResolutionContext {
            app_type_filter: Some(TargetType::Stack),
            ..Default::default()
        };

        let resolved = get_app(&env, &mut ctx, None, "org1", AppCandidates::All)
            .await
            .unwrap();

        assert_eq!(resolved.uid, "a3");
        assert_eq!(ctx.app_uid.as_deref(), Some("a3"));
    }

    #[tokio::test]
    async fn test_stack_app_without_key_resolves_stack() {
        let api = FakeApi::default()
            .with_organizations(vec![org("org1", "A")])
            .with_apps(vec![
                app("a1", "Org app", TargetType::Organization),
                app("a2", "Stack app", TargetType::Stack),
            ])
            .with_stacks(vec![stack("blt1", "Blog"), stack("blt2", "Shop")]);
        // organization, app, stack
        let env = environment(
            api,
            vec![Answer::Select(0), Answer::Select(1), Answer::Select(1)],
        );
        let mut ctx = ResolutionContext::default();

        let target = resolve_install_target(&env, &mut ctx, None).await.unwrap();

        assert_eq!(target.stack_api_key.as_deref(), Some("blt2"));
        assert_eq!(
            env.prompter.asked(),
            vec!["Choose an organization", "Choose an app", "Choose a stack"]
        );
        let request = target.install_request();
        assert_eq!(request.target_type, TargetType::Stack);
        assert_eq!(request.target_uid, "blt2");
    }

    #[tokio::test]
    async fn test_org_app_with_stack_key_requires_confirmation() {
        let api = FakeApi::default()
            .with_organizations(vec![org("org1", "A")])
            .with_apps(vec![
                app("a1", "Org app", TargetType::Organization),
                app("a2", "Stack app", TargetType::Stack),
            ]);
        let env = environment(api, vec![Answer::Confirm(false)]);
        let mut ctx = ResolutionContext {
            org: Some("org1".to_owned()),
            app_uid: Some("a1".to_owned()),
            stack_api_key: Some("blt1".to_owned()),
            ..Default::default()
        };

        let err = resolve_install_target(&env, &mut ctx, None)
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<UserTermination>().is_some());
        assert_eq!(env.prompter.count(), 1);
    }

    #[tokio::test]
    async fn test_org_app_with_stack_key_accepted_targets_organization() {
        let api = FakeApi::default()
            .with_organizations(vec![org("org1", "A")])
            .with_apps(vec![app("a1", "Org app", TargetType::Organization)]);
        let env = environment(api, vec![Answer::Confirm(true)]);
        let mut ctx = ResolutionContext {
            org: Some("org1".to_owned()),
            app_uid: Some("a1".to_owned()),
            stack_api_key: Some("blt1".to_owned()),
            ..Default::default()
        };

        let target = resolve_install_target(&env, &mut ctx, None).await.unwrap();

        assert_eq!(env.prompter.count(), 1);
        assert!(env.prompter.asked()[0].contains("'Org app' is an organization app"));
        assert_eq!(target.app_type, TargetType::Organization);
        let request = target.install_request();
        assert_eq!(request.target_type, TargetType::Organization);
        assert_eq!(request.target_uid, "org1");
    }

    #[tokio::test]
    async fn test_org_app_with_stack_key_and_yes_targets_organization() {
        let api = FakeApi::default()
            .with_organizations(vec![org("org1", "A")])
            .with_apps(vec![app("a1", "Org app", TargetType::Organization)]);
        let env = environment(api, vec![]);
        let mut ctx = ResolutionContext {
            org: Some("org1".to_owned()),
            app_uid: Some("a1".to_owned()),
            stack_api_key: Some("blt1".to_owned()),
            yes: true,
            ..Default::default()
        };

        let target = resolve_install_target(&env, &mut ctx, None).await.unwrap();

        let request = target.install_request();
        assert_eq!(request.target_type, TargetType::Organization);
        assert_eq!(request.target_uid, "org1");
    }

    #[tokio::test]
    async fn test_prompt_count_shrinks_as_values_are_supplied() {
        let api = || {
            FakeApi::default()
                .with_organizations(vec![org("org1", "A")])
                .with_apps(vec![app("a2", "Stack app", TargetType::Stack)])
                .with_stacks(vec![stack("blt1", "Blog")])
        };

        let mut counts = Vec::new();
        let cases = [
            ResolutionContext::default(),
            ResolutionContext {
                org: Some("org1".to_owned()),
                ..Default::default()
            },
            ResolutionContext {
                org: Some("org1".to_owned()),
                app_uid: Some("a2".to_owned()),
                ..Default::default()
            },
            ResolutionContext {
                org: Some("org1".to_owned()),
                app_uid: Some("a2".to_owned()),
                stack_api_key: Some("blt1".to_owned()),
                ..Default::default()
            },
        ];

        for mut ctx in cases {
            let env = environment(api(), vec![Answer::Select(0); 3]);
            let _target = resolve_install_target(&env, &mut ctx, None).await.unwrap();
            counts.push(env.prompter.count());
        }

        assert_eq!(counts, vec![3, 2, 1, 0]);
    }
}
