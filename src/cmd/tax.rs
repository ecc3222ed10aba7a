//! Tax command - federal, state, local and FICA tax on one income

use crate::cmd::chart::PieChart;
use crate::cmd::read_config;
use crate::core::{calculate_income_tax, IncomeTaxConfig, IncomeTaxOverrides, IncomeTaxReport, TaxResult};
use crate::utils::{format_percent, format_usd, round_cents, write_csv};
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
pub struct TaxCommand {
    /// JSON configuration file (or "-" for stdin)
    config: PathBuf,

    /// Gross income, replacing `gross_income`
    #[arg(short, long)]
    income: Option<Decimal>,

    /// Individual 401k contribution, replacing `401k contribution`
    #[arg(short, long)]
    contribution: Option<Decimal>,

    /// Other pre-tax deductions, replacing `pre-tax deductions`
    #[arg(short, long)]
    deductions: Option<Decimal>,

    /// Print only the total effective rate
    #[arg(short = 't', long)]
    rate_only: bool,

    /// Render a pie chart of where the income goes
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

/// Row for CSV output and the source of table rows
#[derive(Debug, Serialize)]
struct TaxRow {
    item: String,
    amount: Decimal,
    effective_rate: Decimal,
}

#[derive(Debug, Tabled)]
struct TaxTableRow {
    #[tabled(rename = "Tax")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Effective Rate")]
    effective_rate: String,
}

impl From<TaxRow> for TaxTableRow {
    fn from(row: TaxRow) -> Self {
        TaxTableRow {
            item: row.item,
            amount: format_usd(row.amount),
            effective_rate: format_percent(row.effective_rate),
        }
    }
}

impl TaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let config: IncomeTaxConfig = read_config(&self.config)?;
        let input = config.resolve(&self.overrides())?;
        let report = calculate_income_tax(&input)?;
        log::info!(
            "Total tax {} on taxable income {}",
            round_cents(report.total.amount),
            report.taxable_income
        );

        if self.rate_only {
            println!("{:.2}", round_cents(report.total.effective_rate));
            return Ok(());
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rounded(&report))?);
        } else if self.csv {
            write_csv(rows(&report), io::stdout())?;
        } else {
            print_report(&report);
        }

        if self.plot {
            chart(&report).show(self.chart.as_deref())?;
        }
        Ok(())
    }

    fn overrides(&self) -> IncomeTaxOverrides {
        IncomeTaxOverrides {
            income: self.income,
            contribution_401k: self.contribution,
            pre_tax_deductions: self.deductions,
        }
    }
}

fn rows(report: &IncomeTaxReport) -> Vec<TaxRow> {
    report
        .jurisdictions()
        .iter()
        .map(|(jurisdiction, result)| (jurisdiction.to_string(), *result))
        .chain(std::iter::once(("Total".to_string(), report.total)))
        .map(|(item, result)| {
            let result = result.rounded();
            TaxRow {
                item,
                amount: result.amount,
                effective_rate: result.effective_rate,
            }
        })
        .collect()
}

fn print_report(report: &IncomeTaxReport) {
    println!();
    println!(
        "Taxable Income: {} ({} gross less {} pre-tax deductions)",
        format_usd(report.taxable_income),
        format_usd(report.gross_income),
        format_usd(report.pre_tax_deductions)
    );
    println!();

    let table = Table::new(rows(report).into_iter().map(TaxTableRow::from))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    println!();
    println!("Net Income: {}", format_usd(report.net_income));
    println!();
}

fn rounded(report: &IncomeTaxReport) -> IncomeTaxReport {
    IncomeTaxReport {
        gross_income: round_cents(report.gross_income),
        pre_tax_deductions: round_cents(report.pre_tax_deductions),
        taxable_income: round_cents(report.taxable_income),
        federal: report.federal.rounded(),
        state: report.state.rounded(),
        local: report.local.rounded(),
        fica: report.fica.rounded(),
        total: report.total.rounded(),
        net_income: round_cents(report.net_income),
    }
}

fn chart(report: &IncomeTaxReport) -> PieChart {
    let slices = report
        .jurisdictions()
        .iter()
        .map(|(jurisdiction, TaxResult { amount, .. })| (jurisdiction.to_string(), *amount))
        .chain(std::iter::once(("Net Income".to_string(), report.net_income)))
        .collect::<Vec<_>>();
    PieChart::new("Income Tax Distribution", slices)
}
