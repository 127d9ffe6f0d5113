//! Cover command - which records each predicate blocks together.

use std::path::PathBuf;

use colored::Colorize;
use tracing::info;

use blocklink::input::RecordOptions;
use blocklink::{Cover, CoverConfig, Parser, RecordReader};

use super::{load_model, print_ranked, write_json};

pub fn run(
    config: PathBuf,
    data: PathBuf,
    output: Option<PathBuf>,
    top: usize,
    id_column: Option<String>,
    shard_size: usize,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !data.exists() {
        return Err(format!("File not found: {}", data.display()).into());
    }

    let model = load_model(&config)?;

    println!(
        "{} {}",
        "Blocking".cyan().bold(),
        data.display().to_string().white()
    );

    let (table, source) = Parser::new().parse_file(&data)?;
    info!(
        rows = source.row_count,
        columns = source.column_count(),
        hash = %source.hash,
        "loaded data file"
    );

    let records = RecordReader::with_options(&model, RecordOptions { id_column }).read(&table)?;
    let predicates = model.predicates();
    let cover =
        Cover::build_with_config(&predicates, &records, None, &CoverConfig { shard_size })?;

    println!(
        "{} records, {} predicates, {} covering",
        records.len().to_string().white().bold(),
        predicates.len().to_string().white().bold(),
        cover.len().to_string().green().bold()
    );
    if verbose {
        println!(
            "Source: {} ({}, {})",
            source.file_name(),
            source.format,
            source.hash
        );
        for column in source.columns_with_missing() {
            println!(
                "  {} {} missing, {} distinct",
                column.name.yellow(),
                column.missing,
                column.distinct
            );
        }
    }
    println!();

    let ranked = cover.ranked();
    print_ranked(&ranked, top, "records");

    if let Some(path) = output {
        write_json(&ranked, &path)?;
    }

    Ok(())
}
