use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bond_return_core::fixed_income::approximation;
use bond_return_core::fixed_income::comparison;
use bond_return_core::fixed_income::exact;
use bond_return_core::fixed_income::risk::{self, RiskInput};
use bond_return_core::fixed_income::scenario::BondReturnInput;

use crate::input;

/// Arguments for price, duration and convexity
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RiskArgs {
    /// Whole years to maturity
    #[arg(long)]
    pub maturity: Option<u32>,

    /// Annual coupon rate (e.g. 0.04 for 4%)
    #[arg(long)]
    pub coupon: Option<Decimal>,

    /// Flat annual yield (e.g. 0.04 for 4%)
    #[arg(long = "yield")]
    pub yield_rate: Option<Decimal>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments shared by the single-scenario return commands
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ReturnArgs {
    /// Whole years to maturity
    #[arg(long)]
    pub maturity: Option<u32>,

    /// Annual coupon rate (e.g. 0.04 for 4%)
    #[arg(long)]
    pub coupon: Option<Decimal>,

    /// Yield at the start of the holding period
    #[arg(long)]
    pub initial_yield: Option<Decimal>,

    /// Yield at the end of the holding period
    #[arg(long)]
    pub shifted_yield: Option<Decimal>,

    /// Holding period in years (default 1)
    #[arg(long)]
    pub elapsed: Option<Decimal>,

    /// Holding period start date, YYYY-MM-DD (30/360)
    #[arg(long)]
    pub horizon_start: Option<NaiveDate>,

    /// Holding period end date, YYYY-MM-DD (30/360)
    #[arg(long)]
    pub horizon_end: Option<NaiveDate>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn return_input(args: ReturnArgs) -> Result<BondReturnInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(data);
    }

    Ok(BondReturnInput {
        maturity_years: args
            .maturity
            .ok_or("--maturity is required (or provide --input)")?,
        coupon_rate: args
            .coupon
            .ok_or("--coupon is required (or provide --input)")?,
        initial_yield: args
            .initial_yield
            .ok_or("--initial-yield is required (or provide --input)")?,
        shifted_yield: args
            .shifted_yield
            .ok_or("--shifted-yield is required (or provide --input)")?,
        elapsed_years: args.elapsed,
        horizon_start: args.horizon_start,
        horizon_end: args.horizon_end,
    })
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let risk_input: RiskInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        RiskInput {
            maturity_years: args
                .maturity
                .ok_or("--maturity is required (or provide --input)")?,
            coupon_rate: args
                .coupon
                .ok_or("--coupon is required (or provide --input)")?,
            yield_rate: args
                .yield_rate
                .ok_or("--yield is required (or provide --input)")?,
        }
    };
    let result = risk::calculate_risk(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_exact_return(args: ReturnArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = exact::calculate_exact_return(&return_input(args)?)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_approximate_return(args: ReturnArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = approximation::calculate_approximate_return(&return_input(args)?)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: ReturnArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = comparison::compare_methods(&return_input(args)?)?;
    Ok(serde_json::to_value(result)?)
}
