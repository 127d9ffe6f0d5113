//! CLI command implementations.

pub mod cover;
pub mod inspect;
pub mod pairs;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use blocklink::variables::load_definitions;
use blocklink::{CoverEntry, DataModel, ModelConfig};

/// Load definitions and build a model without index predicates.
///
/// The CLI has no index service, so index predicates could never be
/// evaluated.
pub(crate) fn load_model(config: &Path) -> Result<DataModel, Box<dyn std::error::Error>> {
    if !config.exists() {
        return Err(format!("File not found: {}", config.display()).into());
    }

    let definitions = load_definitions(config)?;
    let model = DataModel::builder()
        .config(ModelConfig::default().without_index_predicates())
        .definitions(definitions)
        .build()?;
    Ok(model)
}

/// Print the leading entries of a ranked cover.
pub(crate) fn print_ranked<T>(entries: &[CoverEntry<T>], top: usize, unit: &str) {
    if entries.is_empty() {
        println!("{}", "No predicate covers anything.".yellow());
        return;
    }

    for (rank, entry) in entries.iter().take(top).enumerate() {
        println!(
            "{:>4}. {:>6} {}  {}",
            rank + 1,
            entry.size.to_string().white().bold(),
            unit,
            entry.predicate
        );
    }
    if entries.len() > top {
        println!("      ... {} more", entries.len() - top);
    }
}

/// Write a report as pretty JSON.
pub(crate) fn write_json<T: Serialize>(
    value: &T,
    path: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        path.display().to_string().white()
    );
    Ok(())
}
