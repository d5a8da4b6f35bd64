mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use deplint_lib::Policy;
use deplint_lib::deployment::DeploymentLevel;

use crate::output::{OutputFormat, print_error};

/// deplint - structural and security linter for deployment trees
#[derive(Parser)]
#[command(name = "deplint")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Policy file overriding the built-in lists (falls back to DEPLINT_POLICY)
  #[arg(long, global = true)]
  policy: Option<PathBuf>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a compose file and the files it includes
  Compose {
    /// Path to the compose file
    file: PathBuf,
  },

  /// Audit secret files and inline secrets of a deployment
  Secrets {
    /// Deployment directory
    dir: PathBuf,
  },

  /// Check service configuration files against bind, admin, database and telemetry policy
  Config {
    /// Config files, or directories searched recursively for YAML files
    #[arg(required = true)]
    paths: Vec<PathBuf>,
  },

  /// Check host ports against the deployment level's range
  Ports {
    /// Deployment directory
    dir: PathBuf,

    /// Deployment name (default: directory name)
    #[arg(long)]
    name: Option<String>,

    /// Deployment level (default: derived from the name)
    #[arg(long)]
    level: Option<DeploymentLevel>,
  },

  /// Check that a deployment ships what its level requires
  Structure {
    /// Deployment directory
    dir: PathBuf,

    /// Deployment name (default: directory name)
    #[arg(long)]
    name: Option<String>,

    /// Deployment level (default: derived from the name)
    #[arg(long)]
    level: Option<DeploymentLevel>,
  },

  /// Run every check on every deployment under a root directory
  All {
    /// Deployments root
    root: PathBuf,

    /// Configs root that must mirror the deployments root
    #[arg(long)]
    configs: Option<PathBuf>,

    /// Wall-clock budget for the whole run, e.g. "30s" or "2m"
    #[arg(long)]
    budget: Option<humantime::Duration>,
  },
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

/// Dispatch a subcommand. `Ok(false)` means a check found violations.
fn run(cli: Cli) -> Result<bool> {
  let policy = Policy::resolve(cli.policy.as_deref()).context("Failed to load policy")?;
  let format = cli.output;

  match cli.command {
    Commands::Compose { file } => cmd::cmd_compose(&file, &policy, format),
    Commands::Secrets { dir } => cmd::cmd_secrets(&dir, &policy, format),
    Commands::Config { paths } => cmd::cmd_config(&paths, format),
    Commands::Ports { dir, name, level } => cmd::cmd_ports(&dir, name, level, &policy, format),
    Commands::Structure { dir, name, level } => cmd::cmd_structure(&dir, name, level, format),
    Commands::All { root, configs, budget } => {
      cmd::cmd_all(&root, configs.as_deref(), budget.map(Into::into), &policy, format)
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::from(2)
    }
  }
}
