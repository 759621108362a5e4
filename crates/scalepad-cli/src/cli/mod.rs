//! CLI for the ScalePad API client.

mod commands;
mod filter_arg;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scalepad_core::query::FilterClause;
use scalepad_core::{config, logging, ClientConfig, ResourceKind, ScalePadClient};
use std::path::{Path, PathBuf};

use commands::{run_config_path, run_get, run_list, run_resources, ListArgs};
pub use filter_arg::parse_filter;

/// Top-level CLI for the ScalePad API.
#[derive(Debug, Parser)]
#[command(name = "scalepad")]
#[command(about = "Query the ScalePad API from the command line", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/scalepad/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List items of a resource, one JSON object per line.
    List {
        resource: ResourceArg,

        /// Items per page (server default if omitted).
        #[arg(long, value_name = "N")]
        page_size: Option<u32>,

        /// Filter clause, repeatable: name=eq:Acme, id=in:1,2,3, created_at=gte:2024-01-01.
        #[arg(long = "filter", value_name = "FIELD=OP:VALUE", value_parser = parse_filter)]
        filters: Vec<(String, FilterClause)>,

        /// Sort key, repeatable and applied in order; prefix with - for descending.
        #[arg(long = "sort", value_name = "[+|-]FIELD", allow_hyphen_values = true)]
        sort: Vec<String>,

        /// Start from this cursor instead of the first page.
        #[arg(long)]
        cursor: Option<String>,

        /// Follow cursors until the last page.
        #[arg(long, conflicts_with = "max_pages")]
        all: bool,

        /// Follow cursors for at most N pages.
        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,
    },

    /// Fetch one item by ID and print it as pretty JSON.
    Get {
        resource: ResourceArg,
        /// Item identifier.
        id: String,
    },

    /// List the available resources and their API paths.
    Resources,

    /// Print the path of the configuration file.
    ConfigPath,
}

/// Resource names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceArg {
    Clients,
    Contacts,
    Contracts,
    HardwareAssets,
    Members,
    Saas,
    Tickets,
    Opportunities,
}

impl From<ResourceArg> for ResourceKind {
    fn from(arg: ResourceArg) -> Self {
        match arg {
            ResourceArg::Clients => ResourceKind::Clients,
            ResourceArg::Contacts => ResourceKind::Contacts,
            ResourceArg::Contracts => ResourceKind::Contracts,
            ResourceArg::HardwareAssets => ResourceKind::HardwareAssets,
            ResourceArg::Members => ResourceKind::Members,
            ResourceArg::Saas => ResourceKind::Saas,
            ResourceArg::Tickets => ResourceKind::Tickets,
            ResourceArg::Opportunities => ResourceKind::Opportunities,
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        Cli::parse().run().await
    }
}

impl Cli {
    /// Dispatches the parsed command. Only commands that talk to the API load
    /// config and set up file logging.
    pub async fn run(self) -> Result<()> {
        let config_path = self.config.as_deref();
        match self.command {
            CliCommand::Resources => run_resources(),
            CliCommand::ConfigPath => run_config_path(config_path)?,
            CliCommand::List {
                resource,
                page_size,
                filters,
                sort,
                cursor,
                all,
                max_pages,
            } => {
                let client = connect(config_path)?;
                let args = ListArgs {
                    kind: resource.into(),
                    page_size,
                    filters,
                    sort,
                    cursor,
                    all,
                    max_pages,
                };
                run_list(&client, args).await?;
            }
            CliCommand::Get { resource, id } => {
                let client = connect(config_path)?;
                run_get(&client, resource.into(), &id).await?;
            }
        }

        Ok(())
    }
}

/// Loads config, starts logging and builds the API client.
fn connect(config_path: Option<&Path>) -> Result<ScalePadClient> {
    let cfg = load_config(config_path)?;
    init_logging(&cfg);
    tracing::debug!("loaded config: {:?}", cfg);
    ScalePadClient::new(&cfg).context("creating API client")
}

fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    match path {
        Some(path) => Ok(config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?
            .with_env_overrides()),
        None => config::load_or_init().context("loading config"),
    }
}

fn init_logging(cfg: &ClientConfig) {
    let filter = cfg.log_level.as_deref().unwrap_or(logging::DEFAULT_FILTER);
    if let Err(e) = logging::init_logging(filter) {
        logging::init_logging_stderr(filter);
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }
}

#[cfg(test)]
mod tests;
