use camino::Utf8PathBuf;

pub(crate) const DEFAULT_REGION: &str = "NA";

pub(crate) const DEFAULT_APP_NAME: &str = "app-boilerplate";

pub(crate) const DEFAULT_APP_FILE_NAME: &str = "manifest";

/// Organizations and stacks are requested in pages of this size.
pub(crate) const MANAGEMENT_PAGE_LIMIT: u64 = 100;

/// Apps are requested in pages of this size.
pub(crate) const APP_PAGE_LIMIT: u64 = 50;

/// Number of installation lookups in flight at once.
pub(crate) const INSTALLATION_BATCH_SIZE: usize = 10;

pub fn default_data_dir() -> Utf8PathBuf {
    std::env::current_dir()
        .ok()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}
