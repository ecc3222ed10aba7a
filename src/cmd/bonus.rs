//! Bonus command - net bonus after withholding

use crate::cmd::chart::PieChart;
use crate::cmd::read_config;
use crate::core::{calculate_bonus, BonusBreakdown, BonusConfig, BonusOverrides};
use crate::utils::{format_usd, round_cents, write_csv};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BonusCommand {
    /// JSON configuration file (or "-" for stdin)
    config: PathBuf,

    /// Bonus amount, replacing `bonus`
    #[arg(short, long)]
    bonus: Option<Decimal>,

    /// Print only the net bonus
    #[arg(short = 'o', long)]
    net_only: bool,

    /// Render a pie chart of the bonus distribution
    #[arg(short, long)]
    plot: bool,

    /// Write the chart to this file instead of opening it
    #[arg(long, requires = "plot")]
    chart: Option<PathBuf>,

    /// Output as JSON instead of a formatted table
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output as CSV instead of a formatted table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Serialize)]
struct BonusRow {
    item: &'static str,
    amount: Decimal,
}

#[derive(Debug, Tabled)]
struct BonusTableRow {
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl BonusCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let config: BonusConfig = read_config(&self.config)?;
        let overrides = BonusOverrides { bonus: self.bonus };
        let breakdown = calculate_bonus(&config.resolve(&overrides)?)?;
        log::info!("Net bonus {}", round_cents(breakdown.net_bonus));

        if self.plot {
            chart(&breakdown).show(self.chart.as_deref())?;
        }

        if self.net_only {
            println!("{:.2}", round_cents(breakdown.net_bonus));
        } else if self.json {
            println!("{}", serde_json::to_string_pretty(&rounded(&breakdown))?);
        } else if self.csv {
            write_csv(rows(&breakdown), io::stdout())?;
        } else {
            let table = Table::new(rows(&breakdown).into_iter().map(|row| BonusTableRow {
                item: row.item,
                amount: format_usd(row.amount),
            }))
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
            println!();
            println!("{}", table);
            println!();
        }
        Ok(())
    }
}

fn rows(breakdown: &BonusBreakdown) -> Vec<BonusRow> {
    breakdown
        .line_items()
        .iter()
        .map(|&(item, amount)| BonusRow {
            item,
            amount: round_cents(amount),
        })
        .collect()
}

fn rounded(breakdown: &BonusBreakdown) -> BonusBreakdown {
    BonusBreakdown {
        bonus: round_cents(breakdown.bonus),
        federal_tax: round_cents(breakdown.federal_tax),
        state_tax: round_cents(breakdown.state_tax),
        local_tax: round_cents(breakdown.local_tax),
        fica: round_cents(breakdown.fica),
        net_bonus: round_cents(breakdown.net_bonus),
    }
}

/// Everything except the gross bonus, which the other slices add up to
fn chart(breakdown: &BonusBreakdown) -> PieChart {
    PieChart::new("Bonus Distribution", breakdown.line_items().into_iter().skip(1))
}
