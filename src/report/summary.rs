//! Portfolio summary report generation

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use polars::prelude::ChunkAgg;
use serde::Serialize;

use crate::pipeline::error::Result;
use crate::pipeline::{columns, format_currency, ValuedTable};

/// Headline numbers for a valued (and possibly filtered) table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub houses_analyzed: usize,
    pub recommended: usize,
    /// Share of analyzed houses recommended, in percent
    pub recommended_pct: f64,
    /// Sum of expected profit over recommended houses
    pub total_expected_profit: f64,
    /// Mean expected profit per recommended house
    pub mean_expected_profit: f64,
}

impl PortfolioSummary {
    pub fn from_table(table: &ValuedTable) -> Result<Self> {
        let houses_analyzed = table.height();
        let recommended = table.recommended_count()?;

        // Non-recommended rows carry zero profit, so the column sum is the total
        let total_expected_profit = table
            .df()
            .column(columns::PROFIT)?
            .f64()?
            .sum()
            .unwrap_or(0.0);

        let recommended_pct = if houses_analyzed > 0 {
            recommended as f64 / houses_analyzed as f64 * 100.0
        } else {
            0.0
        };
        let mean_expected_profit = if recommended > 0 {
            total_expected_profit / recommended as f64
        } else {
            0.0
        };

        Ok(Self {
            houses_analyzed,
            recommended,
            recommended_pct,
            total_expected_profit,
            mean_expected_profit,
        })
    }

    /// One-line headline, e.g. "A total of 21,436 homes were analyzed, ..."
    pub fn headline(&self) -> String {
        format!(
            "A total of {} homes were analyzed, {:.0}% ({}) are recommended for purchase.",
            group_thousands(self.houses_analyzed),
            self.recommended_pct,
            group_thousands(self.recommended)
        )
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("PORTFOLIO SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        if self.houses_analyzed == 0 {
            println!(
                "      {}",
                style("No houses match the selected filters - nothing to show").dim()
            );
            return;
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("🏠 Houses Analyzed"),
            Cell::new(group_thousands(self.houses_analyzed)),
        ]);

        table.add_row(vec![
            Cell::new("✅ Recommended"),
            Cell::new(format!(
                "{} ({:.1}%)",
                group_thousands(self.recommended),
                self.recommended_pct
            ))
            .fg(if self.recommended > 0 {
                Color::Green
            } else {
                Color::White
            }),
        ]);

        table.add_row(vec![
            Cell::new("💰 Total Expected Profit"),
            Cell::new(format_currency(self.total_expected_profit))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let color = if self.mean_expected_profit < 0.0 {
            Color::Red
        } else {
            Color::Cyan
        };
        table.add_row(vec![
            Cell::new("📈 Mean Profit / House"),
            Cell::new(format_currency(self.mean_expected_profit)).fg(color),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        println!();
        println!("      {}", style(self.headline()).dim());
    }
}

fn group_thousands(n: usize) -> String {
    // Reuse the currency grouping and strip the symbol
    format_currency(n as f64).trim_start_matches('$').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_formatting() {
        let summary = PortfolioSummary {
            houses_analyzed: 21_436,
            recommended: 8_889,
            recommended_pct: 8_889.0 / 21_436.0 * 100.0,
            total_expected_profit: 0.0,
            mean_expected_profit: 0.0,
        };
        assert_eq!(
            summary.headline(),
            "A total of 21,436 homes were analyzed, 41% (8,889) are recommended for purchase."
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(1_000), "1,000");
    }
}
