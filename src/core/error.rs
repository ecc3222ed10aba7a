use rust_decimal::Decimal;

/// Errors raised while validating inputs or computing results.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
    /// Effective rate is a ratio over income, so it has no value at or below zero.
    #[error("effective rate is undefined for income {income}")]
    UndefinedEffectiveRate { income: Decimal },
}

impl CalcError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Reject negative amounts and rates.
pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> Result<Decimal, CalcError> {
    if value < Decimal::ZERO {
        return Err(CalcError::invalid(field, format!("must not be negative, got {value}")));
    }
    Ok(value)
}

/// Unwrap a checked `Decimal` operation, reporting overflow against `field`.
pub(crate) fn in_range(field: &str, value: Option<Decimal>) -> Result<Decimal, CalcError> {
    value.ok_or_else(|| CalcError::invalid(field, "value too large"))
}
