//! Budget command - yearly and per-paycheck budget against net salary

use crate::cmd::chart::PieChart;
use crate::cmd::read_config;
use crate::core::budget::BudgetInput;
use crate::core::{calculate_budget, BudgetConfig, BudgetOverrides, BudgetReport, IncomeTaxConfig, TaxBasis};
use crate::utils::{format_percent, format_usd, round_cents};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BudgetCommand {
    /// JSON configuration file (or "-" for stdin)
    config: PathBuf,

    /// Flat tax rate in percent, replacing `income.tax_rate`
    #[arg(short, long)]
    tax_rate: Option<Decimal>,

    /// Income tax configuration used to assess tax from brackets
    #[arg(long, conflicts_with = "tax_rate")]
    tax_config: Option<PathBuf>,

    /// Base salary, replacing `income.base_salary`
    #[arg(short, long)]
    income: Option<Decimal>,

    /// 401k contribution, replacing `retirement.max_401k_contribution`
    #[arg(short, long)]
    contribution: Option<Decimal>,

    /// Pre-tax deductions, replacing `misc.pre-tax deductions`
    #[arg(short, long)]
    deductions: Option<Decimal>,

    /// Post-tax bonus, replacing `income.post_tax_bonus`
    #[arg(short, long)]
    bonus: Option<Decimal>,

    /// Render a pie chart of the budget when it balances
    #[arg(short, long)]
    plot: bool,

    /// Write the chart to this file instead of opening it
    #[arg(long, requires = "plot")]
    chart: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct BudgetRow {
    #[tabled(rename = "Section")]
    section: &'static str,
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl BudgetCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let config: BudgetConfig = read_config(&self.config)?;
        let tax_config = self
            .tax_config
            .as_deref()
            .map(read_config::<IncomeTaxConfig>)
            .transpose()?;

        let input = config.resolve(&self.overrides(), tax_config.as_ref())?;
        let report = calculate_budget(&input)?;
        log::info!(
            "Accumulated spending {} against net salary {}",
            round_cents(report.summary.accumulated_spending),
            round_cents(report.income.net_salary)
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_inputs(&input);
            print_results(&report);
        }

        if self.plot {
            if report.summary.passes {
                PieChart::new("Annual Budget Breakdown", report.chart_slices()?)
                    .show(self.chart.as_deref())?;
            } else {
                log::warn!("Budget does not balance, skipping chart");
            }
        }
        Ok(())
    }

    fn overrides(&self) -> BudgetOverrides {
        BudgetOverrides {
            tax_rate: self.tax_rate,
            income: self.income,
            contribution_401k: self.contribution,
            pre_tax_deductions: self.deductions,
            post_tax_bonus: self.bonus,
        }
    }
}

fn print_inputs(input: &BudgetInput) {
    println!();
    println!("INPUTS");
    println!("------");
    println!("Base Salary: {}", format_usd(input.base_salary));
    match &input.tax {
        TaxBasis::Flat { rate } => println!("Tax Rate: {}", format_percent(*rate)),
        TaxBasis::Assessed(report) => println!(
            "Tax Rate: {} (assessed from brackets on {})",
            format_percent(report.total.effective_rate),
            format_usd(report.taxable_income)
        ),
    }
    println!("Paycheck Frequency: {} paychecks per year", input.paycheck_frequency);
    println!("Post-Tax Bonus: {}", format_usd(input.post_tax_bonus));
    println!("Expenses:");
    for (category, amount) in &input.expenses {
        println!("  - {}: {}", category, format_usd(*amount));
    }
    println!("Max 401k Contribution: {}", format_usd(input.max_401k_contribution));
    println!("Max Roth IRA Contribution: {}", format_usd(input.max_roth_ira_contribution));
    println!("Employer Match Percentages:");
    for tier in &input.employer_match {
        println!("  - {}% for {}", tier.percent, tier.duration);
    }
    println!("Miscellaneous:");
    println!("  - savings_rate: {}", input.savings_rate);
    println!("  - emergency_fund_months: {}", input.emergency_fund_months);
    println!("  - emergency_fund_payoff_months: {}", input.emergency_fund_payoff_months);
    println!("  - stock: {}", input.stock);
    println!("  - stock_matching: {}", input.stock_matching);
    println!("  - pre-tax deductions: {}", format_usd(input.pre_tax_deductions));
}

fn print_results(report: &BudgetReport) {
    println!();
    println!("RESULTS");
    println!("-------");

    let table = Table::new(rows(report))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    println!();
    let status = if report.summary.passes { "PASS" } else { "FAIL" };
    println!("Budget: {}", status);
    println!("{}", report.summary.verdict);
    println!();
}

fn rows(report: &BudgetReport) -> Vec<BudgetRow> {
    report
        .sections()
        .into_iter()
        .flat_map(|(section, items)| {
            items.into_iter().map(move |(item, amount)| BudgetRow {
                section,
                item,
                amount: format_usd(amount),
            })
        })
        .collect()
}
