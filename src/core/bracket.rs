//! Progressive bracket tax and flat-rate tax.

use super::error::{ensure_non_negative, in_range, CalcError};
use crate::utils::round_cents;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Marginal rate (percent) applied to income up to `bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub rate: Decimal,
    pub bound: Decimal,
}

impl From<(Decimal, Decimal)> for Bracket {
    fn from((rate, bound): (Decimal, Decimal)) -> Self {
        Bracket { rate, bound }
    }
}

/// A validated bracket table, ascending by bound.
///
/// The first entry is the baseline, conventionally `(0, 0)`; its rate is never
/// applied. Bounds are strictly increasing and rates are non-negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Brackets(Vec<Bracket>);

impl Brackets {
    /// Build a table, naming `field` in any validation error.
    pub fn new(field: &str, brackets: Vec<Bracket>) -> Result<Self, CalcError> {
        for (index, bracket) in brackets.iter().enumerate() {
            ensure_non_negative(&format!("{field}[{index}].rate"), bracket.rate)?;
        }
        for (index, pair) in brackets.windows(2).enumerate() {
            if pair[1].bound <= pair[0].bound {
                return Err(CalcError::invalid(
                    format!("{field}[{}]", index + 1),
                    format!(
                        "bounds must be strictly increasing, got {} after {}",
                        pair[1].bound, pair[0].bound
                    ),
                ));
            }
        }
        Ok(Brackets(brackets))
    }

    pub fn from_pairs(field: &str, pairs: &[(Decimal, Decimal)]) -> Result<Self, CalcError> {
        Self::new(field, pairs.iter().copied().map(Bracket::from).collect())
    }

    pub fn as_slice(&self) -> &[Bracket] {
        &self.0
    }

    /// Highest bound in the table; income above it is not taxed.
    pub fn top_bound(&self) -> Option<Decimal> {
        self.0.last().map(|b| b.bound)
    }
}

/// Tax owed and the effective rate (percent of income).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaxResult {
    pub amount: Decimal,
    pub effective_rate: Decimal,
}

impl TaxResult {
    pub const ZERO: TaxResult = TaxResult {
        amount: Decimal::ZERO,
        effective_rate: Decimal::ZERO,
    };

    /// Both values rounded to two decimal places.
    pub fn rounded(&self) -> TaxResult {
        TaxResult {
            amount: round_cents(self.amount),
            effective_rate: round_cents(self.effective_rate),
        }
    }

    /// Sums amounts and rates. Only meaningful for results computed on the same income.
    pub fn try_add(self, other: TaxResult) -> Result<TaxResult, CalcError> {
        Ok(TaxResult {
            amount: in_range("income", self.amount.checked_add(other.amount))?,
            effective_rate: in_range("income", self.effective_rate.checked_add(other.effective_rate))?,
        })
    }
}

/// Compute stepped marginal tax on `income`.
///
/// Full slices are taxed while income exceeds a bracket's bound; the first
/// bracket whose bound is not exceeded gets the partial slice and ends the walk.
pub fn compute_bracket_tax(income: Decimal, brackets: &Brackets) -> Result<TaxResult, CalcError> {
    let table = brackets.as_slice();
    if table.is_empty() {
        return Ok(TaxResult::ZERO);
    }
    if income <= Decimal::ZERO {
        return Err(CalcError::UndefinedEffectiveRate { income });
    }

    let mut total = Decimal::ZERO;
    for (previous, current) in table.iter().zip(table.iter().skip(1)) {
        if income > current.bound {
            let slice = slice_tax(current.bound, previous.bound, current.rate)?;
            log::debug!(
                "Bracket {}% up to {}: full slice, tax {}",
                current.rate,
                current.bound,
                slice
            );
            total = in_range("income", total.checked_add(slice))?;
        } else {
            if income > previous.bound {
                let slice = slice_tax(income, previous.bound, current.rate)?;
                log::debug!(
                    "Bracket {}% up to {}: partial slice, tax {}",
                    current.rate,
                    current.bound,
                    slice
                );
                total = in_range("income", total.checked_add(slice))?;
            }
            return with_effective_rate(total, income);
        }
    }

    if let Some(top) = brackets.top_bound() {
        if income > top {
            log::warn!(
                "Income {} exceeds the top bracket bound {}; the excess is not taxed",
                income,
                top
            );
        }
    }
    with_effective_rate(total, income)
}

/// Flat percentage tax, e.g. FICA. The effective rate is the rate itself.
pub fn compute_flat_tax(income: Decimal, rate: Decimal) -> Result<TaxResult, CalcError> {
    Ok(TaxResult {
        amount: in_range("income", income.checked_mul(rate))? / dec!(100),
        effective_rate: rate,
    })
}

/// Tax on the income between `lower` and `upper` at `rate` percent.
fn slice_tax(upper: Decimal, lower: Decimal, rate: Decimal) -> Result<Decimal, CalcError> {
    let width = in_range("income", upper.checked_sub(lower))?;
    Ok(in_range("income", width.checked_mul(rate))? / dec!(100))
}

fn with_effective_rate(amount: Decimal, income: Decimal) -> Result<TaxResult, CalcError> {
    let ratio = in_range("income", amount.checked_div(income))?;
    Ok(TaxResult {
        amount,
        effective_rate: in_range("income", ratio.checked_mul(dec!(100)))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brackets(pairs: &[(Decimal, Decimal)]) -> Brackets {
        Brackets::from_pairs("test", pairs).unwrap()
    }

    fn simple() -> Brackets {
        brackets(&[
            (dec!(0), dec!(0)),
            (dec!(10), dec!(10000)),
            (dec!(20), dec!(50000)),
        ])
    }

    #[test]
    fn income_within_first_bracket() {
        let result = compute_bracket_tax(dec!(5000), &simple()).unwrap();
        assert_eq!(result.amount, dec!(500));
        assert_eq!(result.effective_rate, dec!(10));
    }

    #[test]
    fn income_spanning_brackets() {
        let result = compute_bracket_tax(dec!(40000), &simple()).unwrap();
        // 10% of 10,000 + 20% of 30,000
        assert_eq!(result.amount, dec!(7000));
        assert_eq!(result.effective_rate, dec!(17.5));
    }

    #[test]
    fn income_above_top_bound_leaves_excess_untaxed() {
        let result = compute_bracket_tax(dec!(60000), &simple()).unwrap();
        assert_eq!(result.amount, dec!(9000));
        assert_eq!(result.effective_rate, dec!(15));
    }

    #[test]
    fn income_on_a_bound_stops_in_that_bracket() {
        let result = compute_bracket_tax(dec!(10000), &simple()).unwrap();
        assert_eq!(result.amount, dec!(1000));
        assert_eq!(result.effective_rate, dec!(10));
    }

    #[test]
    fn terminal_bracket_is_not_double_counted() {
        let table = brackets(&[
            (dec!(0), dec!(0)),
            (dec!(10), dec!(10000)),
            (dec!(20), dec!(50000)),
            (dec!(30), dec!(100000)),
        ]);
        let result = compute_bracket_tax(dec!(20000), &table).unwrap();
        // 1,000 from the first bracket, 2,000 from the partial second, nothing from the third
        assert_eq!(result.amount, dec!(3000));
    }

    #[test]
    fn empty_brackets_tax_nothing() {
        let empty = Brackets::default();
        assert_eq!(compute_bracket_tax(dec!(75000), &empty).unwrap(), TaxResult::ZERO);
        assert_eq!(compute_bracket_tax(dec!(0), &empty).unwrap(), TaxResult::ZERO);
    }

    #[test]
    fn zero_income_has_no_effective_rate() {
        let err = compute_bracket_tax(dec!(0), &simple()).unwrap_err();
        assert_eq!(err, CalcError::UndefinedEffectiveRate { income: dec!(0) });
    }

    #[test]
    fn negative_income_has_no_effective_rate() {
        let err = compute_bracket_tax(dec!(-100), &simple()).unwrap_err();
        assert_eq!(err, CalcError::UndefinedEffectiveRate { income: dec!(-100) });
    }

    #[test]
    fn non_zero_baseline_leaves_income_below_it_untaxed() {
        let table = brackets(&[(dec!(0), dec!(12000)), (dec!(10), dec!(20000))]);
        let result = compute_bracket_tax(dec!(8000), &table).unwrap();
        assert_eq!(result, TaxResult::ZERO);

        let result = compute_bracket_tax(dec!(15000), &table).unwrap();
        assert_eq!(result.amount, dec!(300));
    }

    #[test]
    fn tax_and_rate_never_decrease_with_income() {
        let table = brackets(&[
            (dec!(0), dec!(0)),
            (dec!(10), dec!(11600)),
            (dec!(12), dec!(47150)),
            (dec!(22), dec!(100525)),
            (dec!(24), dec!(191950)),
            (dec!(32), dec!(243725)),
            (dec!(35), dec!(609350)),
            (dec!(37), dec!(1000000000)),
        ]);

        let mut previous = compute_bracket_tax(dec!(1), &table).unwrap();
        let mut income = dec!(1);
        while income < dec!(1000000) {
            income += dec!(2500);
            let current = compute_bracket_tax(income, &table).unwrap();
            assert!(current.amount >= previous.amount, "tax fell at income {income}");
            assert!(
                current.effective_rate >= previous.effective_rate,
                "effective rate fell at income {income}"
            );
            previous = current;
        }
    }

    #[test]
    fn flat_tax_uses_rate_as_effective_rate() {
        let result = compute_flat_tax(dec!(100000), dec!(7.65)).unwrap();
        assert_eq!(result.amount, dec!(7650));
        assert_eq!(result.effective_rate, dec!(7.65));
    }

    #[test]
    fn unordered_bounds_rejected() {
        let err = Brackets::from_pairs(
            "federal_bracket",
            &[(dec!(0), dec!(0)), (dec!(10), dec!(5000)), (dec!(20), dec!(5000))],
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "federal_bracket[2]"));
    }

    #[test]
    fn negative_rate_rejected() {
        let err = Brackets::from_pairs("state_bracket", &[(dec!(0), dec!(0)), (dec!(-1), dec!(5000))])
            .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "state_bracket[1].rate"));
    }

    #[test]
    fn results_add_amounts_and_rates() {
        let a = TaxResult {
            amount: dec!(100),
            effective_rate: dec!(1),
        };
        let b = TaxResult {
            amount: dec!(50),
            effective_rate: dec!(0.5),
        };
        assert_eq!(
            a.try_add(b).unwrap(),
            TaxResult {
                amount: dec!(150),
                effective_rate: dec!(1.5)
            }
        );
    }

    #[test]
    fn flat_tax_overflow_is_an_error() {
        let err = compute_flat_tax(dec!(10000000000000000000000000000), dec!(10)).unwrap_err();
        assert_eq!(err, CalcError::invalid("income", "value too large"));
    }

    #[test]
    fn bracket_tax_overflow_is_an_error() {
        let table = brackets(&[
            (dec!(0), dec!(0)),
            (dec!(37), dec!(5000000000000000000000000000)),
            (dec!(40), dec!(6000000000000000000000000000)),
        ]);
        let err = compute_bracket_tax(dec!(5500000000000000000000000000), &table).unwrap_err();
        assert_eq!(err, CalcError::invalid("income", "value too large"));
    }

    #[test]
    fn summing_results_past_the_decimal_range_fails() {
        let big = TaxResult {
            amount: Decimal::MAX,
            effective_rate: dec!(1),
        };
        assert!(big.try_add(big).is_err());
    }
}
