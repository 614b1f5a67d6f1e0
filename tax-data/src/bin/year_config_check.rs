use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use rust_decimal::Decimal;
use tax_core::{FilingStatus, TaxEngine, TaxReturnInput, W2, YearConfig, YearConfigRegistry};
use tax_data::{YearFileSource, init_logging};
use tracing::info;

/// Load year parameter files, validate them, and optionally run a sample return.
///
/// A directory holds `year_YYYY.toml` files, each optionally paired with a
/// `tax_brackets_YYYY.csv` bracket schedule with the columns:
/// - tax_year: The tax year (e.g., 2025)
/// - schedule: The IRS schedule code (X, Y-1, Y-2, Z)
/// - min_income: The minimum income for this bracket
/// - max_income: The maximum income (empty for unlimited)
/// - base_tax: Tax at min_income, checked against the rates
/// - rate: The marginal tax rate as a decimal (e.g., 0.10)
#[derive(Parser, Debug)]
#[command(name = "year-config-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing year_YYYY.toml files
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Only check this tax year
    #[arg(short, long)]
    year: Option<i32>,

    /// Wages for a sample single-W-2 return
    #[arg(short = 'w', long)]
    sample_wages: Option<Decimal>,

    /// Federal withholding on the sample W-2
    #[arg(long, default_value_t = Decimal::ZERO)]
    withholding: Decimal,

    /// Filing status code for the sample return (S, MFJ, MFS, HOH, QSS)
    #[arg(short, long, default_value = "S")]
    filing_status: String,

    /// Debug-level engine logging (overridden by RUST_LOG)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn print_summary(config: &YearConfig) {
    println!("Tax year {}", config.tax_year);
    for status in FilingStatus::ALL {
        let brackets = config.brackets.get(status).map_or(0, Vec::len);
        let deduction = config
            .standard_deduction
            .base
            .get(status)
            .map_or_else(|| "-".to_string(), ToString::to_string);
        println!("  {:<4} {brackets} brackets, standard deduction {deduction}", status.as_str());
    }
    if config.preferential.is_none() {
        println!("  no preferential rates: qualified income uses ordinary brackets");
    }
}

fn sample_return(
    tax_year: i32,
    status: FilingStatus,
    wages: Decimal,
    withholding: Decimal,
) -> TaxReturnInput {
    let mut input = TaxReturnInput::new(tax_year, status);
    input.income.w2.push(W2 {
        wages,
        federal_withholding: withholding,
        social_security_wages: wages,
        medicare_wages: wages,
        ..W2::default()
    });
    input
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose).context("Failed to install logging")?;

    let status = FilingStatus::parse(&args.filing_status)
        .ok_or_else(|| anyhow!("Unknown filing status: {}", args.filing_status))?;

    let mut registry = YearConfigRegistry::with_built_in().context("Built-in parameters are invalid")?;

    if let Some(dir) = &args.dir {
        println!("Loading year files from: {}", dir.display());
        let loaded = registry
            .load_from(&YearFileSource::new(dir))
            .with_context(|| format!("Failed to load year files from: {}", dir.display()))?;
        println!("Loaded {} year file(s).", loaded);
    }

    let years = match args.year {
        Some(year) => vec![year],
        None => registry.available_years(),
    };

    for year in years {
        let config = registry
            .get(year)
            .with_context(|| format!("No parameters for {year}"))?;
        print_summary(&config);

        if let Some(wages) = args.sample_wages {
            let input = sample_return(year, status, wages, args.withholding);
            let result = TaxEngine::new(config)
                .calculate(&input)
                .with_context(|| format!("Sample return for {year} failed"))?;

            info!(tax_year = year, total_tax = %result.total_tax, "sample return computed");
            for warning in &result.warnings {
                println!("  warning: {warning}");
            }
            for (key, value) in result.to_flat_map() {
                println!("  {key} = {value}");
            }
        }
    }

    Ok(())
}
