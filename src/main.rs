//! House Rocket: House Valuation CLI Tool
//!
//! A command-line tool that cleans a house-sale dataset, recommends which
//! houses to buy, prices their resale and summarizes the opportunities.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use houserocket::cli::{confirm_step, run_options, select_filters, Cli, Commands};
use houserocket::pipeline::{
    attach_region_profit, clean_with_stats, filter, filter_options, load_houses, region_profit,
    region_rows, value_with_rules, FilterCriteria, ValuationRules,
};
use houserocket::report::{
    display_opportunities, display_regions, export_run_report, save_table, top_opportunities,
    write_json, CleaningSection, PortfolioSummary, ReportParams, RunReport,
};
use houserocket::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Options {
                input,
                infer_schema_length,
            } => run_options(input, *infer_schema_length),
        };
    }

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;
    let output_path = cli
        .output_path()
        .context("Could not derive an output path from the input")?;
    let report_path = cli
        .report_path()
        .context("Could not derive a report path from the input")?;

    // Filters from file first, then command-line flags on top
    let mut criteria = match &cli.filters {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read filter file: {}", path.display()))?;
            FilterCriteria::from_json_str(&text)
                .with_context(|| format!("Invalid filter file: {}", path.display()))?
        }
        None => FilterCriteria::new(),
    };
    criteria.merge(cli.flag_criteria()?);

    let rules = ValuationRules::default();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(input, &output_path, &criteria.describe());

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading house sales...");
    let table = load_houses(input, cli.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");
    println!("      Rows: {}", table.height());
    println!("      Columns: {}", table.df().width());
    print_step_time(step_start.elapsed());

    // Step 2: Clean
    print_step_header(2, "Clean Records");
    let step_start = Instant::now();
    let (cleaned, stats) = clean_with_stats(&table)?;
    if stats.duplicates_removed > 0 {
        print_count("duplicate house id(s)", stats.duplicates_removed, Some("(removed)"));
    } else {
        print_info("No duplicate house ids");
    }
    if stats.outliers_corrected > 0 {
        print_count(
            "outlier bedroom count(s)",
            stats.outliers_corrected,
            Some(&format!("(replaced with median {})", stats.bedrooms_median)),
        );
    }
    print_success(&format!("{} houses ready for valuation", cleaned.height()));
    print_step_time(step_start.elapsed());

    // Step 3: Value
    print_step_header(3, "Value Houses");
    let step_start = Instant::now();
    let spinner = create_spinner("Classifying houses and pricing resales...");
    let valued = value_with_rules(&cleaned, &rules)?;
    finish_with_success(&spinner, "Valuation complete");
    let overall = PortfolioSummary::from_table(&valued)?;
    print_info(&overall.headline());
    print_step_time(step_start.elapsed());

    // Step 4: Filter
    print_step_header(4, "Filter Houses");
    if !cli.no_confirm && confirm_step("Adjust filters interactively?")? {
        let options = filter_options(&valued)?;
        criteria = select_filters(&options, &criteria)?;
    }
    let step_start = Instant::now();
    let selection = filter(&valued, &criteria)?;
    let filters = criteria.describe();
    if filters.is_empty() {
        print_info("No filters active - keeping every house");
    } else {
        for line in &filters {
            print_info(line);
        }
    }
    if selection.is_empty() {
        print_warning("No houses match the selected filters");
    } else {
        print_success(&format!(
            "{} of {} houses selected",
            selection.height(),
            valued.height()
        ));
    }
    print_step_time(step_start.elapsed());

    // Step 5: Regions
    print_step_header(5, "Region Profit");
    let step_start = Instant::now();
    let regions = region_profit(&selection)?;
    let region_list = region_rows(&regions)?;
    print_count("region(s) with recommended houses", region_list.len(), None);
    if let (Some(boundaries_path), Some(map_path)) = (&cli.geojson, cli.region_map_path()) {
        let spinner = create_spinner("Joining profit onto region boundaries...");
        let text = std::fs::read_to_string(boundaries_path).with_context(|| {
            format!("Failed to read boundary file: {}", boundaries_path.display())
        })?;
        let boundaries: serde_json::Value = serde_json::from_str(&text).with_context(|| {
            format!("Invalid boundary file: {}", boundaries_path.display())
        })?;
        let joined = attach_region_profit(&boundaries, &regions)?;
        let matched = joined["features"].as_array().map_or(0, |f| f.len());
        if matched == 0 {
            finish_with_warning(&spinner, "No boundary matched a region - nothing to map");
        } else {
            write_json(&joined, &map_path)?;
            finish_with_success(
                &spinner,
                &format!("{} region(s) mapped to {}", matched, map_path.display()),
            );
        }
    }
    print_step_time(step_start.elapsed());

    // Step 6: Save
    print_step_header(6, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing output files...");
    let opportunities = top_opportunities(&selection, cli.top)?;
    let selection_summary = PortfolioSummary::from_table(&selection)?;

    let mut output_df = selection.df().clone();
    save_table(&mut output_df, &output_path)?;

    let report = RunReport::new(
        ReportParams {
            input_file: &input.display().to_string(),
            output_file: &output_path.display().to_string(),
            filters,
            rules,
        },
        CleaningSection {
            rows_loaded: stats.rows_in,
            duplicates_removed: stats.duplicates_removed,
            outliers_corrected: stats.outliers_corrected,
            bedrooms_median: stats.bedrooms_median,
        },
        overall,
        selection_summary.clone(),
        region_list.clone(),
        opportunities.clone(),
    );
    export_run_report(&report, &report_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));
    print_info(&format!("Report: {}", report_path.display()));
    print_step_time(step_start.elapsed());

    // Display summary
    selection_summary.display();
    if !selection.is_empty() {
        display_regions(&region_list, cli.top);
        display_opportunities(&opportunities);
    }

    print_completion();

    Ok(())
}
