//! Inspect command - show what a variable configuration expands to.

use std::path::PathBuf;

use blocklink::Variable;
use colored::Colorize;

use super::load_model;

pub fn run(config: PathBuf, features: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(&config)?;

    println!(
        "{} {}",
        "Configuration".cyan().bold(),
        config.display().to_string().white()
    );
    println!();
    println!("{}", "Variables:".yellow().bold());

    for variable in model.variables() {
        let missing = if variable.has_missing() { " (has missing)" } else { "" };
        println!(
            "  {:40} {:12} {:>3} predicates{}",
            variable.name(),
            variable.variable_type().to_string(),
            variable.predicates().len(),
            missing.dimmed()
        );

        if let Variable::Interaction(interaction) = variable {
            println!("      atoms: {}", interaction.interaction_fields.join(", "));
            println!("      derived: {}", interaction.higher_vars.len());
        }

        if verbose {
            for predicate in variable.predicates() {
                println!("      {}", predicate.to_string().dimmed());
            }
        }
    }

    let predicates = model.predicates();
    println!();
    println!(
        "{} distinct predicates, {} feature columns",
        predicates.len().to_string().white().bold(),
        model.feature_names().len().to_string().white().bold()
    );

    if features {
        println!();
        println!("{}", "Features:".yellow().bold());
        for (column, name) in model.feature_names().iter().enumerate() {
            println!("  {:>3}  {}", column, name);
        }
    }

    Ok(())
}
