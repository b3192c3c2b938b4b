//! scriptify - CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use scriptify::terminal::launch::parse_env_pair;
use scriptify::util::{config, logger};
use scriptify::{run_terminal, TerminalOptions, NAME, VERSION};

/// Run PHP projects as services, and poke at them interactively
#[derive(Parser, Debug)]
#[command(name = "scriptify")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// PHP binary used to evaluate code
    #[arg(long, global = true, value_name = "BINARY")]
    php: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open an interactive PHP terminal with autoloader and environment variables
    Terminal {
        /// Optional service name to load environment variables from
        #[arg(value_name = "SERVICE")]
        service: Option<String>,

        /// Set environment variables (can be used multiple times)
        #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,

        /// File to execute before the first prompt
        #[arg(long, value_name = "FILE")]
        preload: Option<PathBuf>,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();

    logger::init_with_level(logger::LogLevel::for_verbosity(args.verbose));

    let mut config = match config::load_user_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("ignoring user config: {}", e);
            config::UserConfig::default()
        }
    };
    if let Some(php) = args.php {
        config.php.binary = php;
    }

    match args.command {
        Commands::Terminal {
            service,
            env,
            preload,
        } => {
            let options = TerminalOptions {
                service,
                env,
                preload,
            };
            run_terminal(&options, &config)?;
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}
