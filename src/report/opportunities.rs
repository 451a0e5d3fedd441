//! Best purchase opportunities and top regions tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::error::Result;
use crate::pipeline::{columns, format_currency, Recommendation, RegionProfit, ValuedTable};

/// A recommended house with its resale plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub id: i64,
    pub zipcode: i64,
    pub date: String,
    pub price: f64,
    pub price_sale: f64,
    pub profit: f64,
}

/// The `n` recommended houses with the highest expected profit.
///
/// Ties on profit are broken by `id` ascending.
pub fn top_opportunities(table: &ValuedTable, n: usize) -> Result<Vec<Opportunity>> {
    let df = table
        .df()
        .clone()
        .lazy()
        .filter(col(columns::BUY_HOUSE).eq(lit(Recommendation::Yes.as_str())))
        .sort(
            [columns::PROFIT, columns::ID],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .limit(n as IdxSize)
        .collect()?;

    let ids = df.column(columns::ID)?.i64()?;
    let zipcodes = df.column(columns::ZIPCODE)?.i64()?;
    let dates = df.column(columns::DATE)?.str()?;
    let prices = df.column(columns::PRICE)?.f64()?;
    let sales = df.column(columns::PRICE_SALE)?.f64()?;
    let profits = df.column(columns::PROFIT)?.f64()?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        if let (Some(id), Some(zipcode), Some(date), Some(price), Some(price_sale), Some(profit)) = (
            ids.get(i),
            zipcodes.get(i),
            dates.get(i),
            prices.get(i),
            sales.get(i),
            profits.get(i),
        ) {
            rows.push(Opportunity {
                id,
                zipcode,
                date: date.to_string(),
                price,
                price_sale,
                profit,
            });
        }
    }
    Ok(rows)
}

/// Print the opportunities table
pub fn display_opportunities(rows: &[Opportunity]) {
    println!();
    println!(
        "    {} {}",
        style("🏡").cyan(),
        style("TOP OPPORTUNITIES").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    if rows.is_empty() {
        println!(
            "      {}",
            style("No recommended houses in the current selection").dim()
        );
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("House ID").add_attribute(Attribute::Bold),
        Cell::new("Zipcode").add_attribute(Attribute::Bold),
        Cell::new("Sold On").add_attribute(Attribute::Bold),
        Cell::new("Bought For").add_attribute(Attribute::Bold),
        Cell::new("Sell For").add_attribute(Attribute::Bold),
        Cell::new("Profit").add_attribute(Attribute::Bold),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(row.zipcode),
            Cell::new(&row.date),
            Cell::new(format_currency(row.price)).set_alignment(CellAlignment::Right),
            Cell::new(format_currency(row.price_sale)).set_alignment(CellAlignment::Right),
            Cell::new(format_currency(row.profit))
                .set_alignment(CellAlignment::Right)
                .fg(Color::Green),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Print the best regions by average expected profit
pub fn display_regions(rows: &[RegionProfit], limit: usize) {
    println!();
    println!(
        "    {} {}",
        style("🗺️ ").cyan(),
        style("AVERAGE EXPECTED PROFIT PER REGION").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    if rows.is_empty() {
        println!("      {}", style("No regions to show").dim());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Zipcode").add_attribute(Attribute::Bold),
        Cell::new("Houses").add_attribute(Attribute::Bold),
        Cell::new("Average Profit").add_attribute(Attribute::Bold),
    ]);

    for row in rows.iter().take(limit) {
        table.add_row(vec![
            Cell::new(row.zipcode),
            Cell::new(row.houses),
            Cell::new(format_currency(row.avg_profit))
                .set_alignment(CellAlignment::Right)
                .fg(Color::Yellow),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }

    if rows.len() > limit {
        println!(
            "      {}",
            style(format!("... and {} more region(s)", rows.len() - limit)).dim()
        );
    }
}
