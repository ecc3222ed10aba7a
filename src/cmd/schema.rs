//! Schema command - print expected configuration formats

use crate::core::budget::{IncomeSettings, MiscSettings, RetirementSettings};
use crate::core::{BonusConfig, BudgetConfig, ConfigField, ConfigSchema, IncomeTaxConfig};
use clap::{Args, ValueEnum};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Calculator whose configuration to describe
    #[arg(value_enum)]
    calculator: Calculator,

    /// Output format: json-schema or fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Calculator {
    Tax,
    Bonus,
    Budget,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the configuration file
    JsonSchema,
    /// Configuration keys with descriptions
    Fields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::Fields => {
                self.print_fields();
                Ok(())
            }
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = match self.calculator {
            Calculator::Tax => schema_for!(IncomeTaxConfig),
            Calculator::Bonus => schema_for!(BonusConfig),
            Calculator::Budget => schema_for!(BudgetConfig),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_fields(&self) {
        match self.calculator {
            Calculator::Tax => {
                print_title("Income Tax Configuration");
                print_section(None, IncomeTaxConfig::config_fields());
                println!("Brackets are [rate_percent, upper_bound] pairs, ascending by bound.");
            }
            Calculator::Bonus => {
                print_title("Bonus Configuration");
                print_section(None, BonusConfig::config_fields());
                println!("Rates are fractions, e.g. 0.22 for 22%.");
            }
            Calculator::Budget => {
                print_title("Budget Configuration");
                print_section(None, BudgetConfig::config_fields());
                print_section(Some("income"), IncomeSettings::config_fields());
                print_section(Some("retirement"), RetirementSettings::config_fields());
                print_section(Some("misc"), MiscSettings::config_fields());
                println!("expenses maps each category to a monthly amount.");
            }
        }
        println!("Optional amounts marked (or --flag) can come from the command line.");
    }
}

fn print_title(title: &str) {
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!();
}

fn print_section(section: Option<&str>, fields: &[ConfigField]) {
    if let Some(section) = section {
        println!("[{}]", section);
    }
    for field in fields {
        let req = if field.required { "required" } else { "optional" };
        println!("{:30} ({:8})  {}", field.name, req, field.description);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(fields: &[ConfigField]) -> Vec<&str> {
        fields.iter().map(|f| f.name).collect()
    }

    #[test]
    fn renamed_keys_listed() {
        let names = names(IncomeTaxConfig::config_fields());
        assert!(names.contains(&"401k contribution"));
        assert!(names.contains(&"pre-tax deductions"));
    }

    #[test]
    fn defaulted_and_optional_fields_not_required() {
        let required: Vec<_> = IncomeSettings::config_fields()
            .iter()
            .filter(|f| f.required)
            .collect();
        assert!(required.is_empty());

        let match_tiers = RetirementSettings::config_fields()
            .iter()
            .find(|f| f.name == "employer_match_percentage")
            .unwrap();
        assert!(!match_tiers.required);
    }

    #[test]
    fn descriptions_come_from_doc_comments() {
        let fica = BonusConfig::config_fields()
            .iter()
            .find(|f| f.name == "fica")
            .unwrap();
        assert!(fica.required);
        assert_eq!(fica.description, "FICA rate as a fraction");
    }

    #[test]
    fn budget_sections_required() {
        assert_eq!(
            names(BudgetConfig::config_fields()),
            ["income", "expenses", "retirement", "misc"]
        );
        assert!(BudgetConfig::config_fields().iter().all(|f| f.required));
    }
}
