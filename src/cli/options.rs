//! `options` subcommand: list the selectable filter values of a dataset

use std::path::Path;

use anyhow::Result;
use console::style;

use crate::pipeline::{clean, filter_options, load_houses, value, FilterField, FilterKind};
use crate::utils::create_spinner;

/// Load, clean and value the dataset, then print every filter field's options
pub fn run_options(input: &Path, infer_schema_length: usize) -> Result<()> {
    println!(
        "\n {} Filter options for {}",
        style("◆").cyan().bold(),
        style(input.display()).dim()
    );
    println!();

    let spinner = create_spinner("Loading and valuing dataset...");
    let table = load_houses(input, infer_schema_length)?;
    let valued = value(&clean(&table)?)?;
    let options = filter_options(&valued)?;
    spinner.finish_with_message(format!(
        "{} {} houses after cleaning",
        style("✓").green(),
        style(valued.height()).yellow()
    ));
    println!();

    for field in FilterField::ALL {
        match field.kind() {
            FilterKind::Membership => {
                let values: Vec<String> =
                    options.values(field).iter().map(|v| v.to_string()).collect();
                println!(
                    "   {} {}",
                    style(format!("{:<10}", field.column())).cyan(),
                    values.join(", ")
                );
            }
            FilterKind::UpperBound => {
                let range = options
                    .range(field)
                    .map(|r| format!("{} - {}", r.min, r.max))
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "   {} {}",
                    style(format!("{:<10}", field.column())).cyan(),
                    range
                );
            }
        }
    }
    println!();

    Ok(())
}
