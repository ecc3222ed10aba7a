mod cmd;
mod core;
mod utils;

use clap::{Parser, Subcommand};
use cmd::bonus::BonusCommand;
use cmd::budget::BudgetCommand;
use cmd::schema::SchemaCommand;
use cmd::tax::TaxCommand;

#[derive(Parser, Debug)]
#[command(name = "fincalc", version, about = "Income tax, bonus and budget calculators")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Federal, state, local and FICA tax on an income
    Tax(TaxCommand),
    /// Net bonus after flat-rate withholding
    Bonus(BonusCommand),
    /// Annual budget and per-paycheck spending check
    Budget(BudgetCommand),
    /// Describe a calculator's configuration file
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tax(cmd) => cmd.exec(),
        Command::Bonus(cmd) => cmd.exec(),
        Command::Budget(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
