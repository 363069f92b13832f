//! Command line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use hexforge_core::HexCoord;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hexforge")]
#[command(about = "Hex-grid fantasy map editor, headless tools")]
pub struct Cli {
    /// Editor config file (JSON); missing fields use defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding map files (default: user data directory)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a blank map
    New {
        id: String,
        /// Overwrite an existing map
        #[arg(long)]
        force: bool,
    },
    /// Print a summary of a map
    Info { id: String },
    /// Roll encounter checks for a region
    Roll {
        id: String,
        /// Region id or name
        region: String,
        /// Number of checks
        #[arg(short = 'n', long, default_value = "1")]
        times: u32,
    },
    /// Apply a generator response (JSON file) to a map
    ApplyGenerated {
        id: String,
        /// File holding the raw generator response
        response: PathBuf,
        #[arg(short, long, value_enum, default_value = "area")]
        kind: GenerateKind,
        /// Wipe the map first (map generation only)
        #[arg(long)]
        clear: bool,
        /// Target cells as q,r (area generation only)
        #[arg(short, long = "select", num_args = 1..)]
        selected: Vec<HexCoord>,
        /// Instruction recorded with the request
        #[arg(long, default_value = "")]
        instruction: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateKind {
    Map,
    Area,
}
