//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::hex_utils::parse_hex_address;

#[derive(Parser)]
#[command(name = "addrlib", version)]
#[command(about = "Address library database and signature tool")]
pub struct Cli {
    #[arg(short, long, global = true, env = "ADDRLIB_CONFIG", default_value = "addrlib.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the database header and record count
    Info {
        #[command(flatten)]
        database: DatabaseArg,
    },

    /// Look up one identifier or address
    Lookup {
        #[command(flatten)]
        database: DatabaseArg,

        #[command(flatten)]
        key: LookupKey,
    },

    /// Write every record as JSON
    Dump {
        #[command(flatten)]
        database: DatabaseArg,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find the first offset matching a signature in an executable image
    Scan {
        #[command(flatten)]
        executable: ExecutableArg,

        /// Signature such as "40 53 ? 83"
        pattern: String,
    },

    /// Resolve REL::ID / REL::Offset markers found in a source tree
    Markers {
        #[command(flatten)]
        source: SourceArg,

        #[command(flatten)]
        database: DatabaseArg,

        /// Write the signature generator input list here
        #[arg(short, long)]
        generation_file: Option<PathBuf>,
    },

    /// Check which entries of a generated signature list match the image
    Verify {
        #[command(flatten)]
        executable: ExecutableArg,

        /// Signature generator output ("0xADDR: pattern" lines)
        signatures: PathBuf,
    },

    /// Write the finalized CSV for all markers in a source tree
    Report {
        #[command(flatten)]
        source: SourceArg,

        #[command(flatten)]
        database: DatabaseArg,

        /// Signature generator output to verify and include
        #[arg(long)]
        signatures: Option<PathBuf>,

        #[command(flatten)]
        executable: ExecutableArg,

        /// Overrides the configured image base
        #[arg(long, value_parser = parse_hex_address)]
        image_base: Option<u64>,

        #[arg(short, long, default_value = "finalized.csv")]
        output: PathBuf,
    },

    /// Rewrite markers to new-build offsets from a completed finalized CSV
    Remap {
        #[command(flatten)]
        source: SourceArg,

        /// Finalized CSV with the NewAddress column filled in
        finalized: PathBuf,

        /// Overrides the configured image base
        #[arg(long, value_parser = parse_hex_address)]
        image_base: Option<u64>,

        /// Write rewritten files under this directory instead of the source tree
        #[arg(short, long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the source files
        #[arg(long)]
        in_place: bool,
    },
}

#[derive(Args)]
pub struct DatabaseArg {
    /// Address library database (.bin)
    #[arg(short, long, env = "ADDRLIB_DATABASE")]
    pub database: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExecutableArg {
    /// Raw executable image
    #[arg(short, long, env = "ADDRLIB_EXECUTABLE")]
    pub executable: Option<PathBuf>,
}

#[derive(Args)]
pub struct SourceArg {
    /// Root of the C++ source tree
    #[arg(short, long = "source", env = "ADDRLIB_SOURCE_DIR")]
    pub source_dir: Option<PathBuf>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct LookupKey {
    /// Identifier to resolve to an address
    #[arg(long)]
    pub id: Option<u64>,

    /// Address (hex) to resolve to an identifier
    #[arg(long, value_parser = parse_hex_address)]
    pub address: Option<u64>,
}
