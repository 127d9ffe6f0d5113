//! Blocklink CLI - inspect blocking predicates and build covers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Inspect { config, features } => {
            commands::inspect::run(config, features, cli.verbose)
        }

        Commands::Cover {
            config,
            data,
            output,
            top,
            id_column,
            shard_size,
        } => commands::cover::run(
            config,
            data,
            output,
            top,
            id_column,
            shard_size,
            cli.verbose,
        ),

        Commands::Pairs {
            config,
            training,
            output,
            top,
        } => commands::pairs::run(config, training, output, top, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
