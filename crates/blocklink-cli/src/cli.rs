//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Blocklink: blocking predicates for record linkage
#[derive(Parser)]
#[command(name = "blocklink")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the variables, predicates and features of a configuration
    Inspect {
        /// Path to the variable definitions (JSON array)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Also list the feature-vector columns
        #[arg(long)]
        features: bool,
    },

    /// Build a cover of a data file under every simple predicate
    Cover {
        /// Path to the variable definitions (JSON array)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "DATA")]
        data: PathBuf,

        /// Write the ranked cover as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of predicates to print
        #[arg(long, default_value = "10")]
        top: usize,

        /// Column holding record ids (default: row number)
        #[arg(long)]
        id_column: Option<String>,

        /// Records per worker shard
        #[arg(long, default_value = "1024")]
        shard_size: usize,
    },

    /// Build a comparison cover over labeled training pairs
    Pairs {
        /// Path to the variable definitions (JSON array)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Path to the training pairs (JSON)
        #[arg(value_name = "TRAINING")]
        training: PathBuf,

        /// Write the ranked cover as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of predicates to print
        #[arg(long, default_value = "10")]
        top: usize,
    },
}
