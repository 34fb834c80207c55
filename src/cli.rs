use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::*;
use tracing::{debug, info};

use crate::client::{PlatformClient, PlatformConfig, DEFAULT_TIMEOUT_SECS};
use crate::discovery::{self, Discovery};
use crate::error::DbaasError;
use crate::formatter::{self, OutputFormat};
use crate::launcher::LaunchCommand;
use crate::selector;

#[derive(Parser, Debug)]
#[command(name = "dbaas-shell")]
#[command(author = "Florian")]
#[command(version = "0.1.0")]
#[command(about = "Open a shell to a database bound to a tsuru app", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Pick this entry instead of prompting
    #[arg(short, long, global = true)]
    pub index: Option<usize>,

    /// Print the client command without running it
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Name of the app
    #[arg(short = 'a', long = "app", global = true)]
    pub app: Option<String>,

    /// Platform API base URL
    #[arg(long, env = "TSURU_TARGET", global = true, hide_env_values = true)]
    pub tsuru_target: Option<String>,

    /// Platform API token
    #[arg(long, env = "TSURU_TOKEN", global = true, hide_env_values = true)]
    pub tsuru_token: Option<String>,

    /// Registry namespaces to search, highest priority first
    #[arg(long = "namespace", global = true)]
    pub namespaces: Vec<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick a database and open its native client (default)
    Shell,
    /// Print the discovered databases
    List {
        #[arg(short, long, default_value = "table")]
        output_format: OutputFormat,

        #[arg(long)]
        show_passwords: bool,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<ExitCode> {
        let app = self
            .target
            .app
            .clone()
            .ok_or_else(|| DbaasError::ConfigError("an app name is required (-a <app>)".to_string()))?;

        let discovery = self.discover(&app).await?;
        for failure in &discovery.failures {
            eprintln!("{} {}", "Warning:".yellow().bold(), failure);
        }

        match &self.command {
            Some(Commands::List {
                output_format,
                show_passwords,
            }) => {
                let dbs = formatter::redact(&discovery.descriptors, *show_passwords);
                println!("{}", formatter::format_descriptors(&dbs, *output_format)?);
                Ok(ExitCode::SUCCESS)
            }
            Some(Commands::Shell) | None => self.open_shell(&app, discovery).await,
        }
    }

    async fn discover(&self, app: &str) -> Result<Discovery> {
        let config = PlatformConfig::new(
            self.target.tsuru_target.clone(),
            self.target.tsuru_token.clone(),
            Duration::from_secs(self.target.timeout),
        )?;
        let client = PlatformClient::new(config)?;
        let env = client.fetch_env(app).await?;

        let namespaces = if self.target.namespaces.is_empty() {
            discovery::default_namespaces()
        } else {
            self.target.namespaces.clone()
        };
        debug!("Searching namespaces {:?}", namespaces);

        let discovery = discovery::discover(&env, &namespaces);
        info!("Discovered {} database endpoint(s)", discovery.descriptors.len());
        Ok(discovery)
    }

    async fn open_shell(&self, app: &str, discovery: Discovery) -> Result<ExitCode> {
        let dbs = discovery.descriptors;
        if dbs.is_empty() {
            return Err(DbaasError::NoDatabases(app.to_string()).into());
        }

        let index = match self.index {
            Some(index) => selector::parse_selection(&index.to_string(), dbs.len())?,
            None => match selector::prompt(&dbs)? {
                Some(index) => index,
                None => return Ok(ExitCode::from(130)),
            },
        };

        let command = LaunchCommand::for_descriptor(&dbs[index]);
        println!("{}", command);
        if self.dry_run {
            return Ok(ExitCode::SUCCESS);
        }

        let code = command.run().await?;
        Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
    }
}
