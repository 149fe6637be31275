//! Config command - View and manage configuration
//!
//! Provides commands for:
//! - Showing the effective configuration
//! - Creating a default config file (local or global)
//! - Showing configuration file paths

use std::path::PathBuf;

use anyhow::{Context, Result};
use busview_config::{BusviewConfig, ConfigLoader};
use clap::Subcommand;
use serde::Serialize;


/// Config management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show(ShowArgs),

    /// Create a configuration file with default values
    Init(InitArgs),

    /// Show configuration file paths
    Path(PathArgs),
}

/// Arguments for the show command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the init command
#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Create the global config (~/.busview/config.toml) instead of a local one
    #[arg(long)]
    global: bool,
}

/// Arguments for the path command
#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Configuration paths
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPaths {
    /// Global config file path
    pub global: Option<PathBuf>,
    /// Local config file path
    pub local: PathBuf,
    /// Whether global config exists
    pub global_exists: bool,
    /// Whether local config exists
    pub local_exists: bool,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, config: Result<BusviewConfig>) -> Result<()> {
    match cmd {
        ConfigCommand::Show(args) => execute_show(args, config?),
        ConfigCommand::Init(args) => execute_init(args),
        ConfigCommand::Path(args) => execute_path(args),
    }
}

fn execute_show(args: ShowArgs, config: BusviewConfig) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("Failed to render configuration")?
        );
    }
    Ok(())
}

fn execute_init(args: InitArgs) -> Result<()> {
    let loader = ConfigLoader::new();

    let path = if args.global {
        loader.init_global()?
    } else {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        loader.init_local(&cwd)?
    };

    println!("Configuration written to {}", path.display());
    Ok(())
}

fn execute_path(args: PathArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let loader = ConfigLoader::new();

    let global_path = loader.global_config_path();
    let local_path = loader.local_config_path(&cwd);

    let paths = ConfigPaths {
        global_exists: global_path.as_ref().is_some_and(|p| p.exists()),
        local_exists: local_path.exists(),
        global: global_path,
        local: local_path,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    println!("Configuration Paths");
    println!("===================\n");

    if let Some(ref gp) = paths.global {
        let status = if paths.global_exists {
            "exists"
        } else {
            "not found"
        };
        println!("Global: {} ({})", gp.display(), status);
    } else {
        println!("Global: not available (no home directory)");
    }

    let status = if paths.local_exists {
        "exists"
    } else {
        "not found"
    };
    println!("Local:  {} ({})", paths.local.display(), status);

    Ok(())
}
