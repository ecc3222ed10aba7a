use super::bracket::{compute_bracket_tax, compute_flat_tax, Brackets, TaxResult};
use super::error::{ensure_non_negative, in_range, CalcError};
use super::schema::{resolve, ConfigDocument};
use fincalc_derive::ConfigSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Income tax configuration file
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, ConfigSchema)]
pub struct IncomeTaxConfig {
    /// Annual gross income (or --income)
    #[schemars(with = "Option<f64>")]
    pub gross_income: Option<Decimal>,
    /// Individual 401k contribution (or --contribution)
    #[serde(rename = "401k contribution")]
    #[schemars(with = "Option<f64>")]
    pub contribution_401k: Option<Decimal>,
    /// Other pre-tax deductions (or --deductions)
    #[serde(rename = "pre-tax deductions")]
    #[schemars(with = "Option<f64>")]
    pub pre_tax_deductions: Option<Decimal>,
    /// Federal brackets as [rate_percent, upper_bound] pairs
    #[schemars(with = "Option<Vec<(f64, f64)>>")]
    pub federal_bracket: Option<Vec<(Decimal, Decimal)>>,
    /// State brackets as [rate_percent, upper_bound] pairs
    #[schemars(with = "Option<Vec<(f64, f64)>>")]
    pub state_bracket: Option<Vec<(Decimal, Decimal)>>,
    /// Local brackets as [rate_percent, upper_bound] pairs
    #[schemars(with = "Option<Vec<(f64, f64)>>")]
    pub local_bracket: Option<Vec<(Decimal, Decimal)>>,
    /// FICA rate in percent
    #[schemars(with = "f64")]
    pub fica: Decimal,
}

impl ConfigDocument for IncomeTaxConfig {}

/// Command-line values that replace configured ones
#[derive(Debug, Clone, Copy, Default)]
pub struct IncomeTaxOverrides {
    pub income: Option<Decimal>,
    pub contribution_401k: Option<Decimal>,
    pub pre_tax_deductions: Option<Decimal>,
}

/// Validated inputs for [`calculate_income_tax`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeTaxInput {
    pub gross_income: Decimal,
    pub contribution_401k: Decimal,
    pub pre_tax_deductions: Decimal,
    pub federal: Brackets,
    pub state: Brackets,
    pub local: Brackets,
    pub fica_rate: Decimal,
}

impl IncomeTaxConfig {
    pub fn resolve(&self, overrides: &IncomeTaxOverrides) -> Result<IncomeTaxInput, CalcError> {
        let gross_income = resolve("gross_income", overrides.income, self.gross_income)?;
        let contribution_401k = resolve(
            "401k contribution",
            overrides.contribution_401k,
            self.contribution_401k,
        )?;
        let pre_tax_deductions = resolve(
            "pre-tax deductions",
            overrides.pre_tax_deductions,
            self.pre_tax_deductions,
        )?;

        Ok(IncomeTaxInput {
            gross_income: ensure_non_negative("gross_income", gross_income)?,
            contribution_401k: ensure_non_negative("401k contribution", contribution_401k)?,
            pre_tax_deductions: ensure_non_negative("pre-tax deductions", pre_tax_deductions)?,
            federal: brackets("federal_bracket", &self.federal_bracket)?,
            state: brackets("state_bracket", &self.state_bracket)?,
            local: brackets("local_bracket", &self.local_bracket)?,
            fica_rate: ensure_non_negative("fica", self.fica)?,
        })
    }
}

fn brackets(field: &str, pairs: &Option<Vec<(Decimal, Decimal)>>) -> Result<Brackets, CalcError> {
    match pairs {
        Some(pairs) => Brackets::from_pairs(field, pairs),
        None => {
            log::info!("No {} configured, jurisdiction is untaxed", field);
            Ok(Brackets::default())
        }
    }
}

impl IncomeTaxInput {
    /// 401k plus other pre-tax deductions
    pub fn total_deductions(&self) -> Result<Decimal, CalcError> {
        in_range(
            "pre-tax deductions",
            self.contribution_401k.checked_add(self.pre_tax_deductions),
        )
    }

    /// Income left after 401k and other pre-tax deductions
    pub fn taxable_income(&self) -> Result<Decimal, CalcError> {
        in_range(
            "pre-tax deductions",
            self.gross_income.checked_sub(self.total_deductions()?),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Jurisdiction {
    Federal,
    State,
    Local,
    Fica,
}

impl Jurisdiction {
    pub fn display(&self) -> &'static str {
        match self {
            Jurisdiction::Federal => "Federal Tax",
            Jurisdiction::State => "State Tax",
            Jurisdiction::Local => "Local Tax",
            Jurisdiction::Fica => "FICA Tax",
        }
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Income tax report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeTaxReport {
    pub gross_income: Decimal,
    pub pre_tax_deductions: Decimal,
    pub taxable_income: Decimal,
    pub federal: TaxResult,
    pub state: TaxResult,
    pub local: TaxResult,
    pub fica: TaxResult,
    pub total: TaxResult,
    pub net_income: Decimal,
}

impl IncomeTaxReport {
    pub fn jurisdictions(&self) -> [(Jurisdiction, TaxResult); 4] {
        [
            (Jurisdiction::Federal, self.federal),
            (Jurisdiction::State, self.state),
            (Jurisdiction::Local, self.local),
            (Jurisdiction::Fica, self.fica),
        ]
    }
}

/// Calculate federal, state, local and FICA tax on the deduction-adjusted income.
///
/// Each jurisdiction is computed independently on the same taxable income and
/// the results are summed.
pub fn calculate_income_tax(input: &IncomeTaxInput) -> Result<IncomeTaxReport, CalcError> {
    let deductions = input.total_deductions()?;
    let taxable_income = input.taxable_income()?;
    if taxable_income < Decimal::ZERO {
        return Err(CalcError::invalid(
            "pre-tax deductions",
            format!(
                "deductions of {} exceed gross income {}",
                deductions, input.gross_income
            ),
        ));
    }

    let federal = compute_bracket_tax(taxable_income, &input.federal)?;
    let state = compute_bracket_tax(taxable_income, &input.state)?;
    let local = compute_bracket_tax(taxable_income, &input.local)?;
    let fica = compute_flat_tax(taxable_income, input.fica_rate)?;
    let total = federal.try_add(state)?.try_add(local)?.try_add(fica)?;

    log::debug!(
        "Taxable income {}: federal {}, state {}, local {}, fica {}",
        taxable_income,
        federal.amount,
        state.amount,
        local.amount,
        fica.amount
    );

    Ok(IncomeTaxReport {
        gross_income: input.gross_income,
        pre_tax_deductions: deductions,
        taxable_income,
        federal,
        state,
        local,
        fica,
        total,
        net_income: in_range("income", taxable_income.checked_sub(total.amount))?,
    })
}
