use appctl_primitives::manifest::AppManifest;
use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result as EyreResult, WrapErr};
use tokio::fs;
use tracing::debug;

use crate::prompt::Prompter;

/// Reads `dir/file_name` if it exists.
///
/// A missing file is not an error; a file that exists but is not a manifest is.
pub async fn load(dir: &Utf8Path, file_name: &str) -> EyreResult<Option<AppManifest>> {
    let path = dir.join(file_name);

    if !exists(&path).await {
        debug!(%path, "no local manifest");
        return Ok(None);
    }

    read(&path).await.map(Some)
}

pub async fn read(path: &Utf8Path) -> EyreResult<AppManifest> {
    let contents = fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("failed to read manifest '{path}'"))?;

    serde_json::from_str(&contents).wrap_err_with(|| format!("malformed manifest '{path}'"))
}

/// Writes `manifest` to `dir/<file_stem>.json`.
///
/// When that file exists and overwriting is neither forced nor confirmed, the
/// first free `<file_stem><n>.json` (n = 1, 2, …) is used instead.
pub async fn save<P: Prompter>(
    prompter: &P,
    dir: &Utf8Path,
    file_stem: &str,
    manifest: &AppManifest,
    force: bool,
) -> EyreResult<Utf8PathBuf> {
    let mut path = dir.join(format!("{file_stem}.json"));

    if exists(&path).await
        && !force
        && !prompter.confirm(&format!("'{path}' already exists. Overwrite it?"), false)?
    {
        path = next_free_path(dir, file_stem).await;
    }

    write(&path, manifest).await?;

    Ok(path)
}

pub async fn write(path: &Utf8Path, manifest: &AppManifest) -> EyreResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .wrap_err_with(|| format!("failed to create '{parent}'"))?;
    }

    let contents = serde_json::to_string_pretty(manifest)?;

    fs::write(path, contents)
        .await
        .wrap_err_with(|| format!("failed to write manifest '{path}'"))
}

async fn exists(path: &Utf8Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

async fn next_free_path(dir: &Utf8Path, file_stem: &str) -> Utf8PathBuf {
    let mut suffix = 1_u32;
    loop {
        let candidate = dir.join(format!("{file_stem}{suffix}.json"));
        if !exists(&candidate).await {
            return candidate;
        }
        suffix = suffix.saturating_add(1);
    }
}
