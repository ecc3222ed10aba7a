//! Annual and per-paycheck budget: retirement, stock plan, expenses,
//! emergency fund and savings, checked against net salary.

use super::error::{ensure_non_negative, in_range, CalcError};
use super::income::{calculate_income_tax, IncomeTaxConfig, IncomeTaxOverrides, IncomeTaxReport};
use super::schema::{check_required, resolve, section, ConfigDocument};
use crate::utils::format_usd;
use fincalc_derive::ConfigSchema;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const MONTHS: Decimal = dec!(12);

/// Budget configuration file
#[derive(Debug, Clone, Deserialize, JsonSchema, ConfigSchema)]
pub struct BudgetConfig {
    /// Salary, tax and paycheck settings
    pub income: IncomeSettings,
    /// Monthly expenses by category
    #[schemars(with = "BTreeMap<String, f64>")]
    pub expenses: BTreeMap<String, Decimal>,
    /// 401k and Roth IRA settings
    pub retirement: RetirementSettings,
    /// Savings, emergency fund, stock plan and deductions
    pub misc: MiscSettings,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, ConfigSchema)]
pub struct IncomeSettings {
    /// Annual base salary (or --income)
    #[schemars(with = "Option<f64>")]
    pub base_salary: Option<Decimal>,
    /// Total tax rate in percent (or --tax-rate / --tax-config)
    #[schemars(with = "Option<f64>")]
    pub tax_rate: Option<Decimal>,
    /// Pay periods per year, 26 if omitted
    #[serde(default = "default_paycheck_frequency")]
    pub paycheck_frequency: u32,
    /// Post-tax bonus added to the year (or --bonus)
    #[schemars(with = "Option<f64>")]
    pub post_tax_bonus: Option<Decimal>,
}

fn default_paycheck_frequency() -> u32 {
    26
}

#[derive(Debug, Clone, Deserialize, JsonSchema, ConfigSchema)]
pub struct RetirementSettings {
    /// Individual 401k contribution per year (or --contribution)
    #[schemars(with = "Option<f64>")]
    pub max_401k_contribution: Option<Decimal>,
    /// Roth IRA contribution per year
    #[schemars(with = "f64")]
    pub max_roth_ira_contribution: Decimal,
    /// Employer match tiers as [percent_of_salary, duration] pairs
    #[serde(default)]
    #[schemars(with = "Vec<(f64, f64)>")]
    pub employer_match_percentage: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, ConfigSchema)]
pub struct MiscSettings {
    /// Fraction of each net paycheck put into additional savings
    #[schemars(with = "f64")]
    pub savings_rate: Decimal,
    /// Months of expenses the emergency fund must cover
    #[schemars(with = "f64")]
    pub emergency_fund_months: Decimal,
    /// Months over which to build the emergency fund, 0 to skip
    #[schemars(with = "f64")]
    pub emergency_fund_payoff_months: Decimal,
    /// Fraction of salary contributed to the employee stock plan
    #[schemars(with = "f64")]
    pub stock: Decimal,
    /// Company match as a fraction of the stock contribution
    #[schemars(with = "f64")]
    pub stock_matching: Decimal,
    /// Other pre-tax deductions per year (or --deductions)
    #[serde(rename = "pre-tax deductions")]
    #[schemars(with = "Option<f64>")]
    pub pre_tax_deductions: Option<Decimal>,
}

impl ConfigDocument for BudgetConfig {
    fn check_document(value: &Value) -> Result<(), CalcError> {
        check_required::<Self>(value, None)?;
        check_required::<IncomeSettings>(section(value, "income")?, Some("income"))?;
        check_required::<RetirementSettings>(section(value, "retirement")?, Some("retirement"))?;
        check_required::<MiscSettings>(section(value, "misc")?, Some("misc"))
    }
}

/// Command-line values that replace configured ones
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetOverrides {
    pub tax_rate: Option<Decimal>,
    pub income: Option<Decimal>,
    pub contribution_401k: Option<Decimal>,
    pub pre_tax_deductions: Option<Decimal>,
    pub post_tax_bonus: Option<Decimal>,
}

/// How the annual tax is determined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TaxBasis {
    /// Flat percentage of base salary
    Flat { rate: Decimal },
    /// Full bracket calculation on the deduction-adjusted salary
    Assessed(Box<IncomeTaxReport>),
}

impl TaxBasis {
    pub fn annual_tax(&self, base_salary: Decimal) -> Result<Decimal, CalcError> {
        match self {
            TaxBasis::Flat { rate } => {
                Ok(in_range("income.base_salary", base_salary.checked_mul(*rate))? / dec!(100))
            }
            TaxBasis::Assessed(report) => Ok(report.total.amount),
        }
    }

    /// Rate in percent
    pub fn rate(&self) -> Decimal {
        match self {
            TaxBasis::Flat { rate } => *rate,
            TaxBasis::Assessed(report) => report.total.effective_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchTier {
    pub percent: Decimal,
    pub duration: Decimal,
}

/// Validated inputs for [`calculate_budget`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetInput {
    pub base_salary: Decimal,
    pub tax: TaxBasis,
    pub post_tax_bonus: Decimal,
    pub paycheck_frequency: u32,
    pub expenses: BTreeMap<String, Decimal>,
    pub max_401k_contribution: Decimal,
    pub max_roth_ira_contribution: Decimal,
    pub employer_match: Vec<MatchTier>,
    pub savings_rate: Decimal,
    pub emergency_fund_months: Decimal,
    pub emergency_fund_payoff_months: Decimal,
    pub stock: Decimal,
    pub stock_matching: Decimal,
    pub pre_tax_deductions: Decimal,
}

impl BudgetConfig {
    /// Resolve overrides and the tax basis.
    ///
    /// An explicit `--tax-rate` wins, then a bracket calculation from
    /// `tax_config`, then the configured flat rate.
    pub fn resolve(
        &self,
        overrides: &BudgetOverrides,
        tax_config: Option<&IncomeTaxConfig>,
    ) -> Result<BudgetInput, CalcError> {
        let income = &self.income;
        let retirement = &self.retirement;
        let misc = &self.misc;

        let base_salary = ensure_non_negative(
            "income.base_salary",
            resolve("income.base_salary", overrides.income, income.base_salary)?,
        )?;
        let max_401k_contribution = ensure_non_negative(
            "retirement.max_401k_contribution",
            resolve(
                "retirement.max_401k_contribution",
                overrides.contribution_401k,
                retirement.max_401k_contribution,
            )?,
        )?;
        let pre_tax_deductions = ensure_non_negative(
            "misc.pre-tax deductions",
            resolve(
                "misc.pre-tax deductions",
                overrides.pre_tax_deductions,
                misc.pre_tax_deductions,
            )?,
        )?;
        let post_tax_bonus = ensure_non_negative(
            "income.post_tax_bonus",
            resolve("income.post_tax_bonus", overrides.post_tax_bonus, income.post_tax_bonus)?,
        )?;

        let tax = match (overrides.tax_rate, tax_config) {
            (Some(rate), _) => TaxBasis::Flat {
                rate: ensure_non_negative("tax_rate", rate)?,
            },
            (None, Some(tax_config)) => {
                let tax_overrides = IncomeTaxOverrides {
                    income: Some(base_salary),
                    contribution_401k: Some(max_401k_contribution),
                    pre_tax_deductions: Some(pre_tax_deductions),
                };
                let report = calculate_income_tax(&tax_config.resolve(&tax_overrides)?)?;
                log::info!(
                    "Assessed tax {} ({}% effective) from bracket configuration",
                    report.total.amount.round_dp(2),
                    report.total.effective_rate.round_dp(2)
                );
                TaxBasis::Assessed(Box::new(report))
            }
            (None, None) => TaxBasis::Flat {
                rate: ensure_non_negative(
                    "income.tax_rate",
                    resolve("income.tax_rate", None, income.tax_rate)?,
                )?,
            },
        };

        if income.paycheck_frequency == 0 {
            return Err(CalcError::invalid(
                "income.paycheck_frequency",
                "must be at least one paycheck per year",
            ));
        }

        for (category, amount) in &self.expenses {
            ensure_non_negative(&format!("expenses.{category}"), *amount)?;
        }

        let employer_match = retirement
            .employer_match_percentage
            .iter()
            .enumerate()
            .map(|(index, &(percent, duration))| {
                let field = format!("retirement.employer_match_percentage[{index}]");
                Ok(MatchTier {
                    percent: ensure_non_negative(&field, percent)?,
                    duration: ensure_non_negative(&field, duration)?,
                })
            })
            .collect::<Result<_, CalcError>>()?;

        Ok(BudgetInput {
            base_salary,
            tax,
            post_tax_bonus,
            paycheck_frequency: income.paycheck_frequency,
            expenses: self.expenses.clone(),
            max_401k_contribution,
            max_roth_ira_contribution: ensure_non_negative(
                "retirement.max_roth_ira_contribution",
                retirement.max_roth_ira_contribution,
            )?,
            employer_match,
            savings_rate: ensure_non_negative("misc.savings_rate", misc.savings_rate)?,
            emergency_fund_months: ensure_non_negative(
                "misc.emergency_fund_months",
                misc.emergency_fund_months,
            )?,
            emergency_fund_payoff_months: ensure_non_negative(
                "misc.emergency_fund_payoff_months",
                misc.emergency_fund_payoff_months,
            )?,
            stock: ensure_non_negative("misc.stock", misc.stock)?,
            stock_matching: ensure_non_negative("misc.stock_matching", misc.stock_matching)?,
            pre_tax_deductions,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeSection {
    pub base_salary: Decimal,
    pub gross_paycheck: Decimal,
    pub annual_tax: Decimal,
    pub tax_rate: Decimal,
    pub post_tax_salary: Decimal,
    pub post_tax_paycheck: Decimal,
    pub post_stock_bonus_salary: Decimal,
    pub post_stock_bonus_paycheck: Decimal,
    pub net_salary: Decimal,
    pub net_paycheck: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSection {
    pub stock_contribution: Decimal,
    pub company_contribution: Decimal,
    pub total_contribution: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetirementSection {
    pub individual_401k: Decimal,
    pub employer_match: Decimal,
    pub total_401k: Decimal,
    pub individual_401k_per_paycheck: Decimal,
    pub roth_ira: Decimal,
    pub roth_ira_per_month: Decimal,
    pub roth_ira_per_paycheck: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpensesSection {
    pub categories: BTreeMap<String, Decimal>,
    pub monthly: Decimal,
    pub per_paycheck: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyFundSection {
    pub required: Decimal,
    pub per_month: Decimal,
    pub per_paycheck: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavingsSection {
    pub per_paycheck: Decimal,
    pub per_month: Decimal,
}

/// Where accumulated spending lands relative to net salary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum BudgetVerdict {
    Balanced,
    /// Spending exceeds net salary by these amounts
    Overspending { annual: Decimal, per_paycheck: Decimal },
    /// Net salary exceeds spending by these amounts
    Underspending { annual: Decimal, per_paycheck: Decimal },
}

impl BudgetVerdict {
    pub fn assess(
        spending: Decimal,
        net_salary: Decimal,
        paycheck_frequency: Decimal,
    ) -> Result<Self, CalcError> {
        if spending == net_salary {
            return Ok(BudgetVerdict::Balanced);
        }
        let (high, low) = if spending > net_salary {
            (spending, net_salary)
        } else {
            (net_salary, spending)
        };
        let annual = in_range("expenses", high.checked_sub(low))?;
        let per_paycheck = in_range(
            "income.paycheck_frequency",
            (high / paycheck_frequency).checked_sub(low / paycheck_frequency),
        )?;
        Ok(if spending > net_salary {
            BudgetVerdict::Overspending { annual, per_paycheck }
        } else {
            BudgetVerdict::Underspending { annual, per_paycheck }
        })
    }
}

impl std::fmt::Display for BudgetVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetVerdict::Balanced => write!(f, "Everything is balanced."),
            BudgetVerdict::Overspending { annual, per_paycheck } => write!(
                f,
                "You are using {} more than you have! We need to save more. \
                 This is {} over per paycheck.",
                format_usd(*annual),
                format_usd(*per_paycheck)
            ),
            BudgetVerdict::Underspending { annual, per_paycheck } => write!(
                f,
                "You are saving {} less than you need! There is still more room to spend. \
                 This is saving {} per paycheck.",
                format_usd(*annual),
                format_usd(*per_paycheck)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetSummary {
    pub accumulated_spending: Decimal,
    /// Spending stays below net salary
    pub passes: bool,
    pub verdict: BudgetVerdict,
}

/// Budget report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    pub paycheck_frequency: u32,
    pub income: IncomeSection,
    pub stock: StockSection,
    pub retirement: RetirementSection,
    pub expenses: ExpensesSection,
    pub emergency_fund: EmergencyFundSection,
    pub additional_savings: SavingsSection,
    pub summary: BudgetSummary,
}

pub type LineItems = Vec<(&'static str, Decimal)>;

impl BudgetReport {
    /// Labelled amounts per section, in display order.
    pub fn sections(&self) -> Vec<(&'static str, LineItems)> {
        let income = &self.income;
        let retirement = &self.retirement;
        vec![
            (
                "Income",
                vec![
                    ("Base Salary", income.base_salary),
                    ("Gross Paycheck", income.gross_paycheck),
                    ("Annual Tax", income.annual_tax),
                    ("Post-Tax Salary", income.post_tax_salary),
                    ("Post-Tax Paycheck", income.post_tax_paycheck),
                    ("Post-Stock and Post-Tax Bonus Salary", income.post_stock_bonus_salary),
                    ("Post-Stock and Post-Tax Bonus Paycheck", income.post_stock_bonus_paycheck),
                    ("Net Salary (minus all deductions)", income.net_salary),
                    ("Net Paycheck (minus all deductions)", income.net_paycheck),
                ],
            ),
            (
                "Stock",
                vec![
                    ("Stock Contribution", self.stock.stock_contribution),
                    ("Company Contribution", self.stock.company_contribution),
                    ("Total Contribution", self.stock.total_contribution),
                ],
            ),
            (
                "Retirement",
                vec![
                    ("401k Contribution (Individual)", retirement.individual_401k),
                    ("Employer Match", retirement.employer_match),
                    ("Total 401k Contribution", retirement.total_401k),
                    (
                        "Individual 401k Contribution Per Paycheck",
                        retirement.individual_401k_per_paycheck,
                    ),
                    ("Roth IRA Contribution", retirement.roth_ira),
                    ("Roth IRA Contribution Per Month", retirement.roth_ira_per_month),
                    ("Roth IRA Contribution Per Paycheck", retirement.roth_ira_per_paycheck),
                ],
            ),
            (
                "Expenses",
                vec![
                    ("Monthly Expenses Per Paycheck", self.expenses.per_paycheck),
                    ("Monthly Expenses", self.expenses.monthly),
                ],
            ),
            (
                "Emergency Fund",
                vec![
                    ("Required Emergency Fund", self.emergency_fund.required),
                    ("Emergency Fund Per Paycheck", self.emergency_fund.per_paycheck),
                    ("Emergency Fund Per Month", self.emergency_fund.per_month),
                ],
            ),
            (
                "Additional Savings",
                vec![
                    ("Savings Per Paycheck", self.additional_savings.per_paycheck),
                    ("Savings Per Month", self.additional_savings.per_month),
                ],
            ),
            (
                "Summary",
                vec![("Accumulated Spending", self.summary.accumulated_spending)],
            ),
        ]
    }

    /// Annual amounts for the budget breakdown chart.
    ///
    /// Expense categories with no spending are left out.
    pub fn chart_slices(&self) -> Result<Vec<(String, Decimal)>, CalcError> {
        let savings = in_range(
            "misc.savings_rate",
            self.additional_savings
                .per_month
                .checked_mul(MONTHS)
                .and_then(|annual| annual.checked_add(self.retirement.roth_ira)),
        )?;
        let leftover = in_range(
            "expenses",
            self.income
                .post_tax_salary
                .checked_sub(self.summary.accumulated_spending),
        )?;
        let mut slices = vec![
            (
                "Retirement Contributions".to_string(),
                self.retirement.individual_401k,
            ),
            (
                "Emergency Fund".to_string(),
                in_range(
                    "misc.emergency_fund_months",
                    self.emergency_fund.per_month.checked_mul(MONTHS),
                )?,
            ),
            ("Additional Savings".to_string(), savings),
            ("Leftover".to_string(), leftover),
        ];
        for (category, monthly) in &self.expenses.categories {
            if *monthly > Decimal::ZERO {
                let annual = in_range(&format!("expenses.{category}"), monthly.checked_mul(MONTHS))?;
                slices.push((category.clone(), annual));
            }
        }
        Ok(slices)
    }
}

pub fn calculate_budget(input: &BudgetInput) -> Result<BudgetReport, CalcError> {
    let frequency = Decimal::from(input.paycheck_frequency);
    let base_salary = input.base_salary;
    let salary = |value: Option<Decimal>| in_range("income.base_salary", value);

    let gross_paycheck = base_salary / frequency;

    // Retirement
    let individual_401k_per_paycheck = input.max_401k_contribution / frequency;
    let employer_match = input.employer_match.iter().try_fold(Decimal::ZERO, |sum, tier| {
        let matched = base_salary
            .checked_mul(tier.percent / dec!(100))
            .and_then(|m| m.checked_mul(tier.duration))
            .and_then(|m| sum.checked_add(m));
        in_range("retirement.employer_match_percentage", matched)
    })?;
    let total_401k = in_range(
        "retirement.employer_match_percentage",
        input.max_401k_contribution.checked_add(employer_match),
    )?;

    // Taxes
    let post_401k_salary = salary(
        base_salary
            .checked_sub(input.max_401k_contribution)
            .and_then(|s| s.checked_sub(input.pre_tax_deductions)),
    )?;
    let annual_tax = input.tax.annual_tax(base_salary)?;
    let tax_rate = input.tax.rate();
    let post_tax_salary = salary(post_401k_salary.checked_sub(annual_tax))?;
    let post_tax_paycheck = post_tax_salary / frequency;

    // Stock plan, with the company match taxed at the same rate
    let stock_contribution = in_range("misc.stock", base_salary.checked_mul(input.stock))?;
    let company_contribution = in_range(
        "misc.stock_matching",
        stock_contribution.checked_mul(input.stock_matching),
    )?;
    let post_stock_bonus_salary = salary(
        (Decimal::ONE - tax_rate / dec!(100))
            .checked_mul(company_contribution)
            .and_then(|company| post_tax_salary.checked_add(company))
            .and_then(|s| s.checked_add(input.post_tax_bonus)),
    )?;
    let post_stock_bonus_paycheck = post_stock_bonus_salary / frequency;

    // Roth IRA comes out of the net
    let roth_ira_per_paycheck = input.max_roth_ira_contribution / frequency;
    let roth_ira_per_month = input.max_roth_ira_contribution / MONTHS;
    let net_salary = salary(post_stock_bonus_salary.checked_sub(input.max_roth_ira_contribution))?;
    let net_paycheck = net_salary / frequency;

    // Expenses
    let monthly_expenses = input
        .expenses
        .values()
        .try_fold(Decimal::ZERO, |sum, amount| in_range("expenses", sum.checked_add(*amount)))?;
    let annual_expenses = in_range("expenses", monthly_expenses.checked_mul(MONTHS))?;
    let expenses_per_paycheck = annual_expenses / frequency;

    // Savings
    let savings = |value: Option<Decimal>| in_range("misc.savings_rate", value);
    let savings_per_paycheck = savings(net_paycheck.checked_mul(input.savings_rate))?;
    let savings_per_month = savings(savings_per_paycheck.checked_mul(frequency))? / MONTHS;

    // Emergency fund
    let required_emergency_fund = in_range(
        "misc.emergency_fund_months",
        monthly_expenses.checked_mul(input.emergency_fund_months),
    )?;
    let emergency_fund_per_month = if input.emergency_fund_payoff_months > Decimal::ZERO {
        in_range(
            "misc.emergency_fund_payoff_months",
            required_emergency_fund.checked_div(input.emergency_fund_payoff_months),
        )?
    } else {
        Decimal::ZERO
    };
    let emergency_fund_per_paycheck = in_range(
        "misc.emergency_fund_payoff_months",
        emergency_fund_per_month.checked_mul(MONTHS),
    )? / frequency;

    let per_paycheck_spending = [
        roth_ira_per_paycheck,
        expenses_per_paycheck,
        emergency_fund_per_paycheck,
        savings_per_paycheck,
    ]
    .into_iter()
    .try_fold(individual_401k_per_paycheck, |sum, part| {
        in_range("expenses", sum.checked_add(part))
    })?;
    let accumulated_spending = in_range("expenses", per_paycheck_spending.checked_mul(frequency))?;
    let verdict = BudgetVerdict::assess(accumulated_spending, net_salary, frequency)?;

    log::debug!(
        "Budget: net salary {}, accumulated spending {}",
        net_salary,
        accumulated_spending
    );

    Ok(BudgetReport {
        paycheck_frequency: input.paycheck_frequency,
        income: IncomeSection {
            base_salary,
            gross_paycheck,
            annual_tax,
            tax_rate,
            post_tax_salary,
            post_tax_paycheck,
            post_stock_bonus_salary,
            post_stock_bonus_paycheck,
            net_salary,
            net_paycheck,
        },
        stock: StockSection {
            stock_contribution,
            company_contribution,
            total_contribution: stock_contribution + company_contribution,
        },
        retirement: RetirementSection {
            individual_401k: input.max_401k_contribution,
            employer_match,
            total_401k,
            individual_401k_per_paycheck,
            roth_ira: input.max_roth_ira_contribution,
            roth_ira_per_month,
            roth_ira_per_paycheck,
        },
        expenses: ExpensesSection {
            categories: input.expenses.clone(),
            monthly: monthly_expenses,
            per_paycheck: expenses_per_paycheck,
        },
        emergency_fund: EmergencyFundSection {
            required: required_emergency_fund,
            per_month: emergency_fund_per_month,
            per_paycheck: emergency_fund_per_paycheck,
        },
        additional_savings: SavingsSection {
            per_paycheck: savings_per_paycheck,
            per_month: savings_per_month,
        },
        summary: BudgetSummary {
            accumulated_spending,
            passes: accumulated_spending < net_salary,
            verdict,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_value() -> Value {
        json!({
            "income": {
                "base_salary": 120000,
                "tax_rate": 20,
                "paycheck_frequency": 24,
                "post_tax_bonus": 1200
            },
            "expenses": {
                "rent": 2000,
                "food": 600,
                "insurance": 0
            },
            "retirement": {
                "max_401k_contribution": 24000,
                "max_roth_ira_contribution": 7200,
                "employer_match_percentage": [[3, 1], [2, 0.5]]
            },
            "misc": {
                "savings_rate": 0.1,
                "emergency_fund_months": 3,
                "emergency_fund_payoff_months": 6,
                "stock": 0.05,
                "stock_matching": 0.5,
                "pre-tax deductions": 6000
            }
        })
    }

    fn config() -> BudgetConfig {
        serde_json::from_value(config_value()).unwrap()
    }

    fn report_for(config: &BudgetConfig) -> BudgetReport {
        calculate_budget(&config.resolve(&BudgetOverrides::default(), None).unwrap()).unwrap()
    }

    #[test]
    fn income_and_retirement_figures() {
        let report = report_for(&config());

        assert_eq!(report.income.gross_paycheck, dec!(5000));
        assert_eq!(report.retirement.employer_match, dec!(4800));
        assert_eq!(report.retirement.total_401k, dec!(28800));
        assert_eq!(report.retirement.individual_401k_per_paycheck, dec!(1000));
        assert_eq!(report.income.annual_tax, dec!(24000));
        assert_eq!(report.income.post_tax_salary, dec!(66000));
        assert_eq!(report.income.post_tax_paycheck, dec!(2750));
        assert_eq!(report.stock.company_contribution, dec!(3000));
        assert_eq!(report.income.post_stock_bonus_salary, dec!(69600));
        assert_eq!(report.income.post_stock_bonus_paycheck, dec!(2900));
        assert_eq!(report.retirement.roth_ira_per_month, dec!(600));
        assert_eq!(report.income.net_salary, dec!(62400));
        assert_eq!(report.income.net_paycheck, dec!(2600));
    }

    #[test]
    fn overspending_budget_fails() {
        let report = report_for(&config());

        assert_eq!(report.expenses.monthly, dec!(2600));
        assert_eq!(report.expenses.per_paycheck, dec!(1300));
        assert_eq!(report.additional_savings.per_paycheck, dec!(260));
        assert_eq!(report.additional_savings.per_month, dec!(520));
        assert_eq!(report.emergency_fund.required, dec!(7800));
        assert_eq!(report.emergency_fund.per_month, dec!(1300));
        assert_eq!(report.emergency_fund.per_paycheck, dec!(650));
        assert_eq!(report.summary.accumulated_spending, dec!(84240));
        assert!(!report.summary.passes);
        assert_eq!(
            report.summary.verdict,
            BudgetVerdict::Overspending {
                annual: dec!(21840),
                per_paycheck: dec!(910)
            }
        );
    }

    #[test]
    fn underspending_budget_passes_and_charts() {
        let mut config = config();
        config.expenses.insert("rent".to_string(), dec!(500));
        config.expenses.insert("food".to_string(), dec!(100));
        let report = report_for(&config);

        assert_eq!(report.summary.accumulated_spending, dec!(48240));
        assert!(report.summary.passes);
        assert_eq!(
            report.summary.verdict,
            BudgetVerdict::Underspending {
                annual: dec!(14160),
                per_paycheck: dec!(590)
            }
        );

        let slices = report.chart_slices().unwrap();
        assert_eq!(
            slices,
            vec![
                ("Retirement Contributions".to_string(), dec!(24000)),
                ("Emergency Fund".to_string(), dec!(3600)),
                ("Additional Savings".to_string(), dec!(13440)),
                ("Leftover".to_string(), dec!(17760)),
                ("food".to_string(), dec!(1200)),
                ("rent".to_string(), dec!(6000)),
            ]
        );
    }

    #[test]
    fn emergency_fund_skipped_without_payoff_period() {
        let mut config = config();
        config.misc.emergency_fund_payoff_months = dec!(0);
        let report = report_for(&config);
        assert_eq!(report.emergency_fund.required, dec!(7800));
        assert_eq!(report.emergency_fund.per_month, Decimal::ZERO);
        assert_eq!(report.emergency_fund.per_paycheck, Decimal::ZERO);
    }

    #[test]
    fn overrides_replace_configured_values() {
        let overrides = BudgetOverrides {
            tax_rate: Some(dec!(25)),
            income: Some(dec!(96000)),
            contribution_401k: Some(dec!(12000)),
            pre_tax_deductions: Some(dec!(0)),
            post_tax_bonus: Some(dec!(0)),
        };
        let input = config().resolve(&overrides, None).unwrap();
        assert_eq!(input.base_salary, dec!(96000));
        assert_eq!(input.tax, TaxBasis::Flat { rate: dec!(25) });
        assert_eq!(input.max_401k_contribution, dec!(12000));

        let report = calculate_budget(&input).unwrap();
        assert_eq!(report.income.annual_tax, dec!(24000));
        assert_eq!(report.income.post_tax_salary, dec!(60000));
    }

    #[test]
    fn bracket_config_assesses_tax_on_adjusted_salary() {
        let tax_config: IncomeTaxConfig = serde_json::from_value(json!({
            "federal_bracket": [[0, 0], [10, 10000], [20, 1000000]],
            "fica": 7.65
        }))
        .unwrap();

        let input = config()
            .resolve(&BudgetOverrides::default(), Some(&tax_config))
            .unwrap();
        let report = calculate_budget(&input).unwrap();

        // Taxable 120,000 - 24,000 - 6,000 = 90,000
        // Federal 1,000 + 16,000, FICA 6,885
        assert_eq!(report.income.annual_tax, dec!(23885));
        assert_eq!(report.income.post_tax_salary, dec!(66115));
        match input.tax {
            TaxBasis::Assessed(ref tax) => assert_eq!(tax.taxable_income, dec!(90000)),
            ref other => panic!("expected assessed tax, got {other:?}"),
        }
    }

    #[test]
    fn explicit_rate_wins_over_bracket_config() {
        let tax_config: IncomeTaxConfig =
            serde_json::from_value(json!({ "fica": 7.65 })).unwrap();
        let overrides = BudgetOverrides {
            tax_rate: Some(dec!(30)),
            ..Default::default()
        };
        let input = config().resolve(&overrides, Some(&tax_config)).unwrap();
        assert_eq!(input.tax, TaxBasis::Flat { rate: dec!(30) });
    }

    #[test]
    fn missing_tax_rate_without_alternatives() {
        let mut config = config();
        config.income.tax_rate = None;
        let err = config.resolve(&BudgetOverrides::default(), None).unwrap_err();
        assert_eq!(err, CalcError::MissingField("income.tax_rate".to_string()));
    }

    #[test]
    fn zero_paycheck_frequency_rejected() {
        let mut config = config();
        config.income.paycheck_frequency = 0;
        let err = config.resolve(&BudgetOverrides::default(), None).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "income.paycheck_frequency"));
    }

    #[test]
    fn negative_expense_rejected() {
        let mut config = config();
        config.expenses.insert("refund".to_string(), dec!(-50));
        let err = config.resolve(&BudgetOverrides::default(), None).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "expenses.refund"));
    }

    #[test]
    fn negative_match_tier_rejected() {
        let mut config = config();
        config.retirement.employer_match_percentage = vec![(dec!(3), dec!(1)), (dec!(-3), dec!(1))];
        let err = config.resolve(&BudgetOverrides::default(), None).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "retirement.employer_match_percentage[1]"));

        let mut config = self::config();
        config.retirement.employer_match_percentage = vec![(dec!(3), dec!(-0.5))];
        let err = config.resolve(&BudgetOverrides::default(), None).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "retirement.employer_match_percentage[0]"));
    }

    #[test]
    fn oversized_salary_is_an_error_not_a_panic() {
        let overrides = BudgetOverrides {
            income: Some(Decimal::MAX),
            ..Default::default()
        };
        let input = config().resolve(&overrides, None).unwrap();
        let err = calculate_budget(&input).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref reason, .. } if reason == "value too large"));
    }

    #[test]
    fn missing_nested_field_reported_with_section() {
        let mut value = config_value();
        value["misc"].as_object_mut().unwrap().remove("savings_rate");
        let err = BudgetConfig::check_document(&value).unwrap_err();
        assert_eq!(err, CalcError::MissingField("misc.savings_rate".to_string()));
    }

    #[test]
    fn missing_section_reported() {
        let mut value = config_value();
        value.as_object_mut().unwrap().remove("retirement");
        let err = BudgetConfig::check_document(&value).unwrap_err();
        assert_eq!(err, CalcError::MissingField("retirement".to_string()));
    }

    #[test]
    fn paycheck_frequency_defaults_to_biweekly() {
        let mut value = config_value();
        value["income"].as_object_mut().unwrap().remove("paycheck_frequency");
        assert_eq!(BudgetConfig::check_document(&value), Ok(()));
        let config: BudgetConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.income.paycheck_frequency, 26);
    }

    #[test]
    fn verdict_advice() {
        assert_eq!(
            BudgetVerdict::assess(dec!(52000), dec!(52000), dec!(26)).unwrap().to_string(),
            "Everything is balanced."
        );
        assert_eq!(
            BudgetVerdict::assess(dec!(54600), dec!(52000), dec!(26)).unwrap().to_string(),
            "You are using $2,600.00 more than you have! We need to save more. \
             This is $100.00 over per paycheck."
        );
        assert_eq!(
            BudgetVerdict::assess(dec!(49400), dec!(52000), dec!(26)).unwrap().to_string(),
            "You are saving $2,600.00 less than you need! There is still more room to spend. \
             This is saving $100.00 per paycheck."
        );
    }
}
