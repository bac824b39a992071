mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use commands::remap::RemapOutput;
use commands::report::ReportInputs;
use config::Config;

fn main() -> Result<()> {
    // Initialize logging (stderr, so dumps on stdout stay clean)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("addrlib=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);

    match cli.command {
        Command::Info { database } => commands::info::run(&config.database(database.database)?),
        Command::Lookup { database, key } => {
            let database = config.database(database.database)?;
            commands::lookup::run(&database, &key, config.image_base)
        }
        Command::Dump { database, output } => {
            let database = config.database(database.database)?;
            commands::dump::run(&database, output.as_deref())
        }
        Command::Scan {
            executable,
            pattern,
        } => commands::scan::run(&config.executable(executable.executable)?, &pattern),
        Command::Markers {
            source,
            database,
            generation_file,
        } => {
            let source_dir = config.source_dir(source.source_dir)?;
            let database = config.database(database.database)?;
            commands::markers::run(&source_dir, &database, generation_file.as_deref())
        }
        Command::Verify {
            executable,
            signatures,
        } => commands::verify::run(&config.executable(executable.executable)?, &signatures),
        Command::Report {
            source,
            database,
            signatures,
            executable,
            image_base,
            output,
        } => {
            let source_dir = config.source_dir(source.source_dir)?;
            let database = config.database(database.database)?;
            let executable = match signatures {
                Some(_) => Some(config.executable(executable.executable)?),
                None => None,
            };

            commands::report::run(&ReportInputs {
                source_dir: &source_dir,
                database: &database,
                signatures: signatures.as_deref().zip(executable.as_deref()),
                image_base: image_base.unwrap_or(config.image_base),
                output: &output,
            })
        }
        Command::Remap {
            source,
            finalized,
            image_base,
            output,
            in_place,
        } => {
            let source_dir = config.source_dir(source.source_dir)?;
            let output = match (output.as_deref(), in_place) {
                (Some(dir), _) => RemapOutput::Directory(dir),
                (None, true) => RemapOutput::InPlace,
                (None, false) => RemapOutput::Preview,
            };
            commands::remap::run(
                &source_dir,
                &finalized,
                image_base.unwrap_or(config.image_base),
                output,
            )
        }
    }
}

fn load_config(cli: &Cli) -> Config {
    if !cli.config.exists() {
        debug!("No config file at {:?}, using defaults", cli.config);
        return Config::default();
    }

    match Config::load(&cli.config) {
        Ok(c) => {
            debug!("Loaded config from {:?}", cli.config);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {:#}, using defaults", e);
            Config::default()
        }
    }
}
