use std::process::ExitCode;

use appctl_client::{ApiError, Client, Endpoints};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, Table};
use const_format::concatcp;
use eyre::{Report as EyreReport, Result};
use serde::{Serialize, Serializer};
use thiserror::Error as ThisError;
use tracing::error;
use url::Url;

use crate::config::Config;
use crate::defaults;
use crate::output::{Format, Output, Report};
use crate::prompt::InquirePrompter;

mod app;
pub mod validation;

use app::AppCommand;

pub const EXAMPLES: &str = r"
  # Fetch an app manifest into the current directory
  $ appctl app get --org <org_uid>

  # Install the app described by ./manifest.json into a stack
  $ appctl app install --stack-api-key <api_key>

  # Use the EU region
  $ appctl --region EU app install
";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = concatcp!(
    "Environment variables:\n",
    "  APPCTL_AUTHTOKEN    Authentication token sent with every request\n",
    "  RUST_LOG            Log filter, e.g. appctl=debug\n\n",
    "Examples:",
    EXAMPLES
))]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    App(AppCommand),
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Region whose endpoints are used
    #[arg(long, value_name = "REGION", default_value = defaults::DEFAULT_REGION)]
    pub region: String,

    /// Management API URL, overrides the region's
    #[arg(long, value_name = "URL")]
    pub management_url: Option<Url>,

    /// Developer hub API URL, overrides the region's
    #[arg(long, value_name = "URL")]
    pub developer_hub_url: Option<Url>,

    /// Launch API URL, overrides the region's
    #[arg(long, value_name = "URL")]
    pub launch_url: Option<Url>,

    /// Authentication token
    #[arg(long, value_name = "TOKEN")]
    #[arg(env = "APPCTL_AUTHTOKEN", hide_env_values = true)]
    pub authtoken: Option<String>,

    /// JSON file merged over the built-in configuration
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<Utf8PathBuf>,

    #[arg(long, value_name = "FORMAT", default_value_t, value_enum)]
    pub output_format: Format,
}

impl RootArgs {
    async fn load_config(&self) -> Config {
        let config = Config::default();
        match &self.config {
            Some(path) => config.with_override(path).await,
            None => config,
        }
    }

    fn endpoints(&self, config: &Config) -> Result<Endpoints> {
        let mut endpoints = config.endpoints(&self.region)?;

        if let Some(url) = &self.management_url {
            endpoints.management = url.clone();
        }
        if let Some(url) = &self.developer_hub_url {
            endpoints.developer_hub = url.clone();
        }
        if let Some(url) = &self.launch_url {
            endpoints.launch = url.clone();
        }

        Ok(endpoints)
    }
}

/// What every command runs against: the output sink, the effective
/// configuration, the remote services and the terminal.
#[derive(Debug)]
pub struct Environment<A, P> {
    pub output: Output,
    pub config: Config,
    pub api: A,
    pub prompter: P,
}

impl<A, P> Environment<A, P> {
    pub const fn new(output: Output, config: Config, api: A, prompter: P) -> Self {
        Self {
            output,
            config,
            api,
            prompter,
        }
    }
}

impl RootCommand {
    pub async fn run(self) -> Result<(), CliError> {
        let output = Output::new(self.args.output_format);
        let config = self.args.load_config().await;

        let endpoints = match self.args.endpoints(&config) {
            Ok(endpoints) => endpoints,
            Err(err) => {
                let err = CliError::Other(err);
                output.write(&err);
                return Err(err);
            }
        };

        let client = Client::new(endpoints, self.args.authtoken.clone());
        let environment = Environment::new(output, config, client, InquirePrompter);

        let result = match self.action {
            SubCommands::App(app) => app.run(&environment).await,
        };

        if let Err(err) = result {
            let err = match err.downcast::<ApiError>() {
                Ok(err) => CliError::ApiError(err),
                Err(err) => CliError::Other(err),
            };

            error!(%err, "command failed");
            environment.output.write(&err);
            return Err(err);
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, ThisError)]
pub enum CliError {
    #[error(transparent)]
    ApiError(#[from] ApiError),

    #[error(transparent)]
    Other(
        #[from]
        #[serde(serialize_with = "serialize_eyre_report")]
        EyreReport,
    ),
}

impl CliError {
    fn message(&self) -> String {
        match self {
            Self::ApiError(e) if e.is_conflict() => format!(
                "API Error ({}): {}. Please contact support if the problem persists",
                e.status_code, e.message
            ),
            Self::ApiError(e) => format!("API Error ({}): {}", e.status_code, e.message),
            Self::Other(e) => format!("Error: {e:#}"),
        }
    }
}

impl From<CliError> for ExitCode {
    fn from(_error: CliError) -> Self {
        Self::FAILURE
    }
}

impl Report for CliError {
    fn report(&self) {
        let mut table = Table::new();
        let _ = table.set_header(vec![Cell::new("ERROR").fg(Color::Red)]);
        let _ = table.add_row(vec![self.message()]);
        println!("{table}");
    }
}

fn serialize_eyre_report<S>(report: &EyreReport, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(report.chain().map(|e| e.to_string()))
}
