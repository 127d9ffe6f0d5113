//! Pairs command - which labeled pairs each predicate would block together.

use std::path::PathBuf;

use colored::Colorize;

use blocklink::{ComparisonCover, TrainingData};

use super::{load_model, print_ranked, write_json};

pub fn run(
    config: PathBuf,
    training: PathBuf,
    output: Option<PathBuf>,
    top: usize,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !training.exists() {
        return Err(format!("File not found: {}", training.display()).into());
    }

    let model = load_model(&config)?;
    let data = TrainingData::load(&training)?;
    let predicates = model.predicates();

    println!(
        "{} {} ({} match, {} distinct)",
        "Scoring pairs from".cyan().bold(),
        training.display().to_string().white(),
        data.matches.len().to_string().green(),
        data.distinct.len().to_string().red()
    );

    let matches = ComparisonCover::build(&predicates, &data.matches, None)?;
    let distinct = ComparisonCover::build(&predicates, &data.distinct, None)?;

    println!(
        "{} predicates cover a match, {} cover a distinct pair",
        matches.len().to_string().green().bold(),
        distinct.len().to_string().red().bold()
    );
    println!();

    let ranked = matches.ranked();
    if verbose {
        for entry in ranked.iter().take(top) {
            let false_positives = predicates
                .iter()
                .find(|p| p.fingerprint() == entry.fingerprint)
                .and_then(|p| distinct.get(p))
                .map_or(0, |covered| covered.len());
            println!(
                "  {:>4} match / {:>4} distinct  {}",
                entry.size,
                false_positives,
                entry.predicate
            );
        }
    } else {
        print_ranked(&ranked, top, "matches");
    }

    if let Some(path) = output {
        write_json(&ranked, &path)?;
    }

    Ok(())
}
