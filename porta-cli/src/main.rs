//! porta - seed a 3scale admin portal with demo fixtures.
//!
//! Command-line front end for the fixture tooling. Resolves connection
//! settings from flags, environment variables, and an optional config file,
//! then drives the admin API through the `porta-api` client.

mod commands;

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use porta_core::config::AppConfig;
use porta_core::error::PortaResult;
use porta_core::logging;

use commands::ConnectionOpts;

/// porta - admin portal fixture seeding tool.
#[derive(Parser)]
#[command(
    name = "porta",
    version,
    about = "Seed a 3scale admin portal with demo fixtures",
    long_about = "Populates an admin portal with a demo fixture set:\n\
                  API products, backend APIs, mapping rules, proxy policies,\n\
                  application plans, and users."
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate the portal with the demo products, backends, and users.
    Seed {
        #[command(flatten)]
        connection: ConnectionOpts,
    },
    /// Probe the portal and list the configured API products.
    Check {
        #[command(flatten)]
        connection: ConnectionOpts,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logging::init_console_logging(level);

    let result = match cli.command {
        Commands::Seed { connection } => commands::seed::run(&config, &connection),
        Commands::Check { connection } => commands::check::run(&config, &connection),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&str>) -> PortaResult<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_file(Path::new(path)),
        None => Ok(AppConfig::default()),
    }
}
