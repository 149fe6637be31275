//! Busview CLI - Explore message bus object trees
//!
//! A command-line interface over the lazy introspection cache. Objects are
//! only introspected when a command actually needs their children.
//!
//! # Usage
//!
//! ```bash
//! # Print the object tree of a service on the system bus
//! busview --system -s org.freedesktop.login1 tree
//!
//! # List the children of one object
//! busview -s org.example.Demo ls /org/example
//!
//! # Show a method with its input signature
//! busview -s org.example.Demo member /org/example/Demo org.example.Demo Frobnicate
//!
//! # Work offline from saved introspection dumps
//! busview --fixtures ./dumps tree
//! ```

use std::path::PathBuf;

use anyhow::Result;
use busview_config::{BusType, ConfigOverrides};
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

/// Busview - Lazy explorer for message bus object trees
#[derive(Parser, Debug)]
#[command(name = "busview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Service to introspect (e.g. org.freedesktop.login1)
    #[arg(long, short = 's', global = true, env = "BUSVIEW_SERVICE")]
    service: Option<String>,

    /// Connect to the system bus instead of the session bus
    #[arg(long, global = true)]
    system: bool,

    /// Read introspection dumps from a directory instead of a live bus
    #[arg(long, global = true, env = "BUSVIEW_FIXTURES")]
    fixtures: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true, env = "BUSVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            service: self.service.clone(),
            bus: self.system.then_some(BusType::System),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the object tree below a path
    Tree(commands::tree::TreeArgs),

    /// List the children of an object
    Ls(commands::ls::LsArgs),

    /// Resolve an object path to its canonical form
    Resolve(commands::resolve::ResolveArgs),

    /// Show a single interface member
    Member(commands::member::MemberArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load errors surface once the command needs the configuration;
    // `config init` and `config path` work without a valid one
    let config = commands::load_config(&cli.global);
    let loaded = config.as_ref().ok();

    let log_level = if cli.global.quiet {
        Level::ERROR
    } else if cli.global.verbose {
        Level::DEBUG
    } else {
        loaded
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(Level::INFO)
    };
    let ansi = loaded.map(|c| c.logging.ansi).unwrap_or(true);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Tree(args) => commands::tree::execute(args, &cli.global, &config?),
        Commands::Ls(args) => commands::ls::execute(args, &cli.global, &config?),
        Commands::Resolve(args) => commands::resolve::execute(args, &cli.global, &config?),
        Commands::Member(args) => commands::member::execute(args, &cli.global, &config?),
        Commands::Config(cmd) => commands::config::execute(cmd, config),
    }
}
