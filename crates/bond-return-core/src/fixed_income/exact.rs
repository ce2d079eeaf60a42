use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BondReturnError;
use crate::fixed_income::scenario::{
    validate_bond, validate_elapsed, validate_horizon, validate_yield, BondReturnInput,
};
use crate::fixed_income::schedule::{CashFlowSchedule, RolledSchedule};
use crate::time_value::checked;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::BondReturnResult;

/// Full repricing of a bond over a holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactReturnOutput {
    /// Price at the initial yield, before time passes
    pub initial_price: Money,
    /// Price of the remaining cash flows at the shifted yield
    pub horizon_price: Money,
    /// Cash received during the holding period
    pub paid_cash_flows: Money,
    /// Number of cash flows still outstanding at the horizon
    pub remaining_cash_flows: usize,
    /// (horizon_price + paid_cash_flows) / initial_price - 1
    pub total_return: Rate,
}

/// Exact holding-period return by discounting the cash flow schedule before
/// and after the horizon.
pub fn calculate_exact_return(
    input: &BondReturnInput,
) -> BondReturnResult<ComputationOutput<ExactReturnOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.validate()?;
    let elapsed = input.elapsed()?;

    let output = exact_return(
        input.maturity_years,
        input.coupon_rate,
        input.initial_yield,
        input.shifted_yield,
        elapsed,
    )?;

    if output.paid_cash_flows > Decimal::ZERO {
        warnings.push(format!(
            "{} paid during the holding period is counted at face, without reinvestment.",
            output.paid_cash_flows
        ));
    }

    let elapsed_us = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "elapsed_years": elapsed.to_string(),
        "face_value": "100",
        "coupon_frequency": 1,
        "discounting": "flat annual yield, (1 + y)^-t",
    });

    Ok(with_metadata(
        "Exact Holding-Period Return (full repricing)",
        &assumptions,
        warnings,
        elapsed_us,
        output,
    ))
}

/// Exact return of a `maturity_years` bullet bond paying `coupon_rate` when
/// its yield moves from `initial_yield` to `shifted_yield` over `elapsed`
/// years.
pub fn exact_return(
    maturity_years: u32,
    coupon_rate: Rate,
    initial_yield: Rate,
    shifted_yield: Rate,
    elapsed: Years,
) -> BondReturnResult<ExactReturnOutput> {
    validate_bond(maturity_years, coupon_rate)?;
    validate_yield("initial_yield", initial_yield)?;
    validate_yield("shifted_yield", shifted_yield)?;
    validate_elapsed(elapsed)?;
    validate_horizon(maturity_years, elapsed)?;

    let schedule = CashFlowSchedule::bullet(maturity_years, coupon_rate)?;
    let initial_price = schedule.price(initial_yield)?;
    let rolled = schedule.roll_forward(elapsed);

    exact_return_after_roll(maturity_years, elapsed, initial_price, &rolled, shifted_yield)
}

/// Return once the schedule has already been rolled to the horizon.
pub(crate) fn exact_return_after_roll(
    maturity_years: u32,
    elapsed: Years,
    initial_price: Money,
    rolled: &RolledSchedule,
    shifted_yield: Rate,
) -> BondReturnResult<ExactReturnOutput> {
    if rolled.remaining.is_empty() {
        return Err(BondReturnError::EmptyScheduleAfterHorizon {
            maturity: maturity_years,
            elapsed,
        });
    }
    if initial_price.is_zero() {
        return Err(BondReturnError::DivisionByZero {
            context: "exact return: initial price is zero".to_string(),
        });
    }

    let horizon_price = rolled.remaining.price(shifted_yield)?;
    let total_return = checked(
        horizon_price
            .checked_add(rolled.paid)
            .and_then(|value| value.checked_div(initial_price))
            .and_then(|growth| growth.checked_sub(Decimal::ONE)),
        || format!("return from {initial_price} to {horizon_price}"),
    )?;

    Ok(ExactReturnOutput {
        initial_price,
        horizon_price,
        paid_cash_flows: rolled.paid,
        remaining_cash_flows: rolled.remaining.len(),
        total_return,
    })
}
