use appctl_primitives::hosting::HostingPayload;
use appctl_primitives::installation::Installation;
use appctl_primitives::manifest::AppManifest;
use camino::Utf8PathBuf;
use comfy_table::{Cell, Color, Table};
use serde::Serialize;

use super::Report;

fn table() -> Table {
    let mut table = Table::new();
    let _ = table.load_preset(comfy_table::presets::UTF8_FULL);
    let _ = table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

impl Report for AppManifest {
    fn report(&self) {
        let mut table = table();

        let _ = table.set_header(vec![
            Cell::new("UID").fg(Color::Blue),
            Cell::new("Name").fg(Color::Blue),
            Cell::new("Target").fg(Color::Blue),
            Cell::new("Version").fg(Color::Blue),
            Cell::new("Organization").fg(Color::Blue),
        ]);

        let _ = table.add_row(vec![
            self.uid.clone(),
            self.name.clone(),
            self.target_type.to_string(),
            self.version.map(|v| v.to_string()).unwrap_or_default(),
            self.organization_uid.clone().unwrap_or_default(),
        ]);

        println!("{table}");
    }
}

/// Result of `app get` / `app create` / `app update`.
#[derive(Debug, Serialize)]
pub struct ManifestSaved<'a> {
    pub manifest: &'a AppManifest,
    pub path: Utf8PathBuf,
}

impl Report for ManifestSaved<'_> {
    fn report(&self) {
        self.manifest.report();
        println!("Manifest file saved at '{}'", self.path);
    }
}

/// Result of `app install` / `app reinstall`.
#[derive(Debug, Serialize)]
pub struct InstallOutcome<'a> {
    pub action: &'static str,
    pub app_name: &'a str,
    pub installation: &'a Installation,
}

impl Report for InstallOutcome<'_> {
    fn report(&self) {
        let mut table = table();

        let _ = table.set_header(vec![Cell::new(format!("App {}", self.action)).fg(Color::Green)]);
        let _ = table.add_row(vec![format!(
            "App '{}' {} successfully in {} '{}' (installation '{}')",
            self.app_name,
            self.action,
            self.installation.target.target_type,
            self.installation.target.uid,
            self.installation.uid,
        )]);

        println!("{table}");
    }
}

/// Result of `app deploy`.
#[derive(Debug, Serialize)]
pub struct HostingUpdated<'a> {
    pub app_uid: &'a str,
    pub hosting: &'a HostingPayload,
}

impl Report for HostingUpdated<'_> {
    fn report(&self) {
        let mut table = table();

        let _ = table.set_header(vec![
            Cell::new("App").fg(Color::Blue),
            Cell::new("Provider").fg(Color::Blue),
            Cell::new("Deployment URL").fg(Color::Blue),
        ]);
        let _ = table.add_row(vec![
            self.app_uid.to_owned(),
            self.hosting.provider.to_string(),
            self.hosting.deployment_url.to_string(),
        ]);

        println!("{table}");
        println!("App hosting updated successfully. Reinstall the app for the changes to take effect.");
    }
}
