//! Input validation shared by the `app` subcommands.
//!
//! Each check exists as an eyre-returning function for values typed into a
//! prompt and as a clap value parser for values given as flags.

use camino::Utf8Path;
use eyre::{bail, Result};
use url::Url;

pub const APP_NAME_MIN_LEN: usize = 3;
pub const APP_NAME_MAX_LEN: usize = 20;

/// Validates an app name.
///
/// # Errors
/// Returns an error unless the trimmed name is 3 to 20 characters long.
pub fn validate_app_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if !(APP_NAME_MIN_LEN..=APP_NAME_MAX_LEN).contains(&len) {
        bail!(
            "App name must be between {APP_NAME_MIN_LEN} and {APP_NAME_MAX_LEN} characters long, got {len}"
        );
    }
    Ok(())
}

/// Validates a deployment URL.
///
/// # Errors
/// Returns an error if the URL is malformed or not http(s).
pub fn validate_deployment_url(url_str: &str) -> Result<Url> {
    let url = match Url::parse(url_str.trim()) {
        Ok(url) => url,
        Err(err) => bail!(
            "Invalid URL '{url_str}': {err}. Expected format: http(s)://hostname[:port][/path]"
        ),
    };

    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "Invalid URL '{url_str}': unsupported scheme '{}'. Expected format: http(s)://hostname[:port][/path]",
            url.scheme()
        );
    }

    Ok(url)
}

/// Validates that a file exists.
///
/// # Errors
/// Returns an error if the path is missing or is not a file.
pub fn validate_file_exists(path: &Utf8Path) -> Result<()> {
    if !path.exists() {
        bail!("File not found: '{path}'");
    }
    if !path.is_file() {
        bail!("Path is not a file: '{path}'");
    }
    Ok(())
}

/// Clap value parser for app names.
///
/// Can be used with `#[arg(value_parser = app_name)]`
pub fn app_name(s: &str) -> Result<String, String> {
    validate_app_name(s).map_err(|err| err.to_string())?;
    Ok(s.trim().to_owned())
}

/// Clap value parser for deployment URLs.
///
/// Can be used with `#[arg(value_parser = deployment_url)]`
pub fn deployment_url(s: &str) -> Result<Url, String> {
    validate_deployment_url(s).map_err(|err| err.to_string())
}
