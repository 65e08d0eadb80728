//! # wawona-settings demo application
//!
//! A small CLI that drives the settings engine the way the Wawona settings
//! screen does. It exists to exercise the crate by hand.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example wawona_settings_demo -- settings list
//! cargo run --example wawona_settings_demo -- settings set waypipeVideo av1
//! cargo run --example wawona_settings_demo -- settings active
//! cargo run --example wawona_settings_demo -- settings apply --dry-run
//! cargo run --example wawona_settings_demo -- address
//! ```
//!
//! Pass `--store some.toml` to work on a scratch settings file instead of the
//! one in the platform config directory, and `--profile platform.toml` to
//! layer a platform profile on top of the built-in Android one.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use wawona_settings::net::{AddressLookup, SystemLookup, display_address};
use wawona_settings::{ApplyRecord, SettingsArgs, SettingsBuilder, SettingsError, TomlFileStore};

/// wawona-settings demo: inspect and edit Wawona settings.
#[derive(Parser, Debug)]
#[command(name = "wawona-settings-demo")]
struct Cli {
    /// Log resolution and apply details.
    #[arg(long, global = true)]
    verbose: bool,

    /// Settings file to use instead of the default location.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Extra platform profile file.
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage settings (list, get, set, unset, reset, active, apply).
    Settings(SettingsArgs),
    /// Show the local IPv4 address a remote waypipe should connect to.
    Address,
}

// Stands in for the native compositor: prints what it receives.
fn print_sink(record: &ApplyRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    eprintln!("[native] received settings record v{}", ApplyRecord::VERSION);
    for (param, value) in record.fields() {
        eprintln!("[native]   {} = {value}", param.name());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), SettingsError> {
    match cli.command {
        Commands::Address => {
            println!("{}", display_address(SystemLookup.local_ipv4()));
            Ok(())
        }
        Commands::Settings(args) => {
            let mut builder = SettingsBuilder::new();
            if let Some(profile) = cli.profile {
                builder = builder.profile_file(profile);
            }
            let mut settings = match cli.store {
                Some(path) => builder.build(TomlFileStore::open(path)?)?,
                None => builder.open_default()?,
            };
            settings.handle_and_print(&args.into_action(), &mut print_sink)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {e}");
    }

    run(cli).unwrap_or_else(|e| {
        eprintln!("Settings error:\n{e}");
        std::process::exit(1);
    });
}
