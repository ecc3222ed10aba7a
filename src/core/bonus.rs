use super::error::{ensure_non_negative, in_range, CalcError};
use super::schema::{resolve, ConfigDocument};
use fincalc_derive::ConfigSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Bonus configuration file. Rates are fractions, e.g. 0.22 for 22%.
#[derive(Debug, Clone, Deserialize, JsonSchema, ConfigSchema)]
pub struct BonusConfig {
    /// Gross bonus amount (or --bonus)
    #[schemars(with = "Option<f64>")]
    pub bonus: Option<Decimal>,
    /// Federal withholding rate as a fraction
    #[schemars(with = "f64")]
    pub federal_tax_rate: Decimal,
    /// State withholding rate as a fraction
    #[schemars(with = "f64")]
    pub state_tax_rate: Decimal,
    /// Local withholding rate as a fraction
    #[schemars(with = "f64")]
    pub local_tax_rate: Decimal,
    /// FICA rate as a fraction
    #[schemars(with = "f64")]
    pub fica: Decimal,
}

impl ConfigDocument for BonusConfig {}

#[derive(Debug, Clone, Copy, Default)]
pub struct BonusOverrides {
    pub bonus: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusInput {
    pub bonus: Decimal,
    pub federal_rate: Decimal,
    pub state_rate: Decimal,
    pub local_rate: Decimal,
    pub fica_rate: Decimal,
}

impl BonusConfig {
    pub fn resolve(&self, overrides: &BonusOverrides) -> Result<BonusInput, CalcError> {
        let bonus = resolve("bonus", overrides.bonus, self.bonus)?;
        Ok(BonusInput {
            bonus: ensure_non_negative("bonus", bonus)?,
            federal_rate: ensure_non_negative("federal_tax_rate", self.federal_tax_rate)?,
            state_rate: ensure_non_negative("state_tax_rate", self.state_tax_rate)?,
            local_rate: ensure_non_negative("local_tax_rate", self.local_tax_rate)?,
            fica_rate: ensure_non_negative("fica", self.fica)?,
        })
    }
}

/// Bonus after withholding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusBreakdown {
    pub bonus: Decimal,
    pub federal_tax: Decimal,
    pub state_tax: Decimal,
    pub local_tax: Decimal,
    pub fica: Decimal,
    pub net_bonus: Decimal,
}

impl BonusBreakdown {
    /// Labelled amounts in display order, starting with the gross bonus.
    pub fn line_items(&self) -> [(&'static str, Decimal); 6] {
        [
            ("Initial Bonus", self.bonus),
            ("Federal Tax", self.federal_tax),
            ("State Tax", self.state_tax),
            ("Local Tax", self.local_tax),
            ("FICA", self.fica),
            ("Net Bonus", self.net_bonus),
        ]
    }
}

pub fn calculate_bonus(input: &BonusInput) -> Result<BonusBreakdown, CalcError> {
    let bonus = input.bonus;
    let withheld = [input.state_rate, input.local_rate, input.fica_rate]
        .into_iter()
        .try_fold(input.federal_rate, |sum, rate| {
            in_range("federal_tax_rate", sum.checked_add(rate))
        })?;
    let kept = in_range("federal_tax_rate", Decimal::ONE.checked_sub(withheld))?;
    let net_bonus = in_range("bonus", bonus.checked_mul(kept))?;
    if net_bonus < Decimal::ZERO {
        log::warn!("Withholding rates sum to {}, net bonus is negative", withheld);
    }

    Ok(BonusBreakdown {
        bonus,
        federal_tax: in_range("bonus", bonus.checked_mul(input.federal_rate))?,
        state_tax: in_range("bonus", bonus.checked_mul(input.state_rate))?,
        local_tax: in_range("bonus", bonus.checked_mul(input.local_rate))?,
        fica: in_range("bonus", bonus.checked_mul(input.fica_rate))?,
        net_bonus,
    })
}
