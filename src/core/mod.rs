pub mod bonus;
pub mod bracket;
pub mod budget;
pub mod error;
pub mod income;
pub mod schema;

// Flat public surface for domain types and functions.
pub use bonus::{calculate_bonus, BonusBreakdown, BonusConfig, BonusOverrides};
#[allow(unused_imports)]
pub use bracket::{compute_bracket_tax, compute_flat_tax, Bracket, Brackets, TaxResult};
pub use budget::{calculate_budget, BudgetConfig, BudgetOverrides, BudgetReport, TaxBasis};
#[allow(unused_imports)]
pub use error::CalcError;
pub use income::{calculate_income_tax, IncomeTaxConfig, IncomeTaxOverrides, IncomeTaxReport};
pub use schema::{ConfigDocument, ConfigField, ConfigSchema};
