use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use bond_return_core::fixed_income::sweep::{self, ErrorSweepInput, GridAxis};

use crate::input;

/// Arguments for the approximation error sweep
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ErrorSweepArgs {
    /// Whole years to maturity
    #[arg(long, default_value = "5")]
    pub maturity: u32,

    /// Base (initial) yield
    #[arg(long, default_value = "0.04")]
    pub base_yield: Decimal,

    /// Holding period in years
    #[arg(long, default_value = "1")]
    pub elapsed: Decimal,

    /// Lowest coupon rate
    #[arg(long, default_value = "0")]
    pub coupon_min: Decimal,

    /// Highest coupon rate
    #[arg(long, default_value = "0.20")]
    pub coupon_max: Decimal,

    /// Number of evenly spaced coupons
    #[arg(long, default_value = "5")]
    pub coupon_points: u32,

    /// Lowest swept yield
    #[arg(long, default_value = "-0.02")]
    pub yield_min: Decimal,

    /// Highest swept yield
    #[arg(long, default_value = "0.10")]
    pub yield_max: Decimal,

    /// Yield step in basis points
    #[arg(long, default_value = "1")]
    pub yield_step_bps: Decimal,

    /// Emit one series per coupon instead of the grid
    #[arg(long)]
    pub series: bool,

    /// With --series, use the yield shift rather than the yield level as x
    #[arg(long)]
    pub recentered: bool,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn sweep_input(args: &ErrorSweepArgs) -> Result<ErrorSweepInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(data);
    }
    Ok(flags_input(args))
}

fn flags_input(args: &ErrorSweepArgs) -> ErrorSweepInput {
    ErrorSweepInput {
        maturity_years: args.maturity,
        base_yield: args.base_yield,
        elapsed_years: args.elapsed,
        coupon_axis: GridAxis::Linspace {
            start: args.coupon_min,
            end: args.coupon_max,
            points: args.coupon_points,
        },
        yield_axis: GridAxis::Stepped {
            start: args.yield_min,
            end: args.yield_max,
            step: args.yield_step_bps * dec!(0.0001),
        },
    }
}

pub fn run_error_sweep(args: ErrorSweepArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sweep_input = sweep_input(&args)?;
    let output = sweep::run_error_sweep(&sweep_input)?;

    if !args.series {
        return Ok(serde_json::to_value(output)?);
    }

    let series = output.result.grid.series(args.recentered);
    let x_axis = if args.recentered {
        "yield_shift"
    } else {
        "yield_level"
    };
    let mut value = serde_json::to_value(&output)?;
    if let Some(map) = value.as_object_mut() {
        map.insert(
            "result".to_string(),
            serde_json::json!({
                "x_axis": x_axis,
                "series": series,
                "max_abs_error": output.result.max_abs_error,
            }),
        );
    }
    Ok(value)
}
