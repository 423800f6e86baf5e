use core::future::Future;

use appctl_client::MarketplaceApi;
use appctl_primitives::api::Page;
use appctl_primitives::manifest::{AppManifest, TargetType};
use appctl_primitives::organization::{Organization, Stack};
use eyre::Result as EyreResult;
use futures_util::future::try_join_all;
use tracing::warn;

use crate::defaults::{APP_PAGE_LIMIT, INSTALLATION_BATCH_SIZE, MANAGEMENT_PAGE_LIMIT};

/// Logs a failed remote call at `warn` and hands the error back.
pub(crate) fn warn_on_error<T>(result: EyreResult<T>, what: &str) -> EyreResult<T> {
    result.inspect_err(|err| warn!(%err, "{what}"))
}

/// Requests pages of `limit` items until the reported count is exhausted.
///
/// Without a reported count, a short page is the last one. Pages are fetched
/// one after another and concatenated in order.
pub(crate) async fn fetch_all<T, F, Fut>(limit: u64, mut fetch_page: F) -> EyreResult<Vec<T>>
where
    F: FnMut(u64, u64) -> Fut,
    Fut: Future<Output = EyreResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut skip = 0_u64;

    loop {
        let page = fetch_page(skip, limit).await?;
        let received = page.items.len() as u64;
        items.extend(page.items);

        skip = skip.saturating_add(limit);

        // An empty page means the count was stale; stop rather than spin.
        let exhausted = match page.count {
            Some(count) => skip >= count,
            None => received < limit,
        };
        if received == 0 || exhausted {
            break;
        }
    }

    Ok(items)
}

pub(crate) async fn fetch_organizations<A: MarketplaceApi>(
    api: &A,
) -> EyreResult<Vec<Organization>> {
    warn_on_error(
        fetch_all(MANAGEMENT_PAGE_LIMIT, |skip, limit| {
            api.list_organizations(skip, limit)
        })
        .await,
        "failed to list organizations",
    )
}

pub(crate) async fn fetch_stacks<A: MarketplaceApi>(
    api: &A,
    organization_uid: &str,
) -> EyreResult<Vec<Stack>> {
    warn_on_error(
        fetch_all(MANAGEMENT_PAGE_LIMIT, |skip, limit| {
            api.list_stacks(organization_uid, skip, limit)
        })
        .await,
        "failed to list stacks",
    )
}

pub(crate) async fn fetch_apps<A: MarketplaceApi>(
    api: &A,
    organization_uid: &str,
    target_type: Option<TargetType>,
) -> EyreResult<Vec<AppManifest>> {
    warn_on_error(
        fetch_all(APP_PAGE_LIMIT, |skip, limit| {
            api.list_apps(organization_uid, target_type, skip, limit)
        })
        .await,
        "failed to list apps",
    )
}

/// Apps of the organization that have at least one installation.
///
/// Installations are looked up [`INSTALLATION_BATCH_SIZE`] apps at a time; a
/// failed lookup fails the whole call and later batches are not requested.
pub(crate) async fn fetch_installed_apps<A: MarketplaceApi>(
    api: &A,
    organization_uid: &str,
    target_type: Option<TargetType>,
) -> EyreResult<Vec<AppManifest>> {
    let apps = fetch_apps(api, organization_uid, target_type).await?;
    let mut installed = Vec::with_capacity(apps.len());

    for batch in apps.chunks(INSTALLATION_BATCH_SIZE) {
        let installations = warn_on_error(
            try_join_all(
                batch
                    .iter()
                    .map(|app| api.list_installations(organization_uid, &app.uid)),
            )
            .await,
            "failed to list installations",
        )?;

        installed.extend(
            batch
                .iter()
                .zip(installations)
                .filter(|(_, installations)| !installations.is_empty())
                .map(|(app, _)| app.clone()),
        );
    }

    Ok(installed)
}
