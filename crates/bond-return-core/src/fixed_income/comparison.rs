use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::fixed_income::approximation::{johansson_from_risk, ApproximateReturnOutput};
use crate::fixed_income::exact::{exact_return_after_roll, ExactReturnOutput};
use crate::fixed_income::risk::{risk_measures, RiskMeasures};
use crate::fixed_income::scenario::{validate_horizon, BondReturnInput};
use crate::fixed_income::schedule::CashFlowSchedule;
use crate::time_value::checked;
use crate::types::{with_metadata, ComputationOutput, PercentagePoints, Rate};
use crate::BondReturnResult;

const PERCENT: Decimal = dec!(100);

/// Every return estimate for one bond and one yield scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodComparison {
    pub risk: RiskMeasures,
    pub exact: ExactReturnOutput,
    pub johansson: ApproximateReturnOutput,
    /// -ModDur * dy + 0.5 * Convexity * dy^2
    pub basic_method_return: Rate,
    /// Basic Method plus cash paid over the horizon relative to P0
    pub basic_method_coupon_adjusted_return: Rate,
    pub errors: MethodErrors,
}

/// (exact - approximation) * 100 for each method, in percentage points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodErrors {
    pub johansson: PercentagePoints,
    pub basic_method: PercentagePoints,
    pub basic_method_coupon_adjusted: PercentagePoints,
}

/// Compare the exact return with Johansson's Method and the Basic Method.
pub fn compare_methods(
    input: &BondReturnInput,
) -> BondReturnResult<ComputationOutput<MethodComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.validate()?;
    let elapsed = input.elapsed()?;
    validate_horizon(input.maturity_years, elapsed)?;

    let schedule = CashFlowSchedule::bullet(input.maturity_years, input.coupon_rate)?;
    let risk = risk_measures(&schedule, input.initial_yield)?;
    let rolled = schedule.roll_forward(elapsed);

    let exact = exact_return_after_roll(
        input.maturity_years,
        elapsed,
        risk.price,
        &rolled,
        input.shifted_yield,
    )?;
    let johansson = johansson_from_risk(
        risk.modified_duration,
        risk.convexity,
        input.initial_yield,
        input.yield_shift()?,
        elapsed,
    )?;

    let basic_method_return = johansson.basic_method_return;
    let basic_method_coupon_adjusted_return = checked(
        rolled
            .paid
            .checked_div(risk.price)
            .and_then(|carry| basic_method_return.checked_add(carry)),
        || "coupon-adjusted Basic Method return".to_string(),
    )?;

    if rolled.paid > Decimal::ZERO {
        warnings.push(
            "Horizon spans a coupon date: the unadjusted Basic Method ignores the coupon received."
                .into(),
        );
    }
    if elapsed > Decimal::ZERO && elapsed < Decimal::ONE {
        warnings.push(format!(
            "Horizon of {} years ends before the first coupon date; no cash is received.",
            elapsed.round_dp(6)
        ));
    }

    let errors = MethodErrors {
        johansson: approximation_error(exact.total_return, johansson.total_return)?,
        basic_method: approximation_error(exact.total_return, basic_method_return)?,
        basic_method_coupon_adjusted: approximation_error(
            exact.total_return,
            basic_method_coupon_adjusted_return,
        )?,
    };

    let output = MethodComparison {
        risk,
        exact,
        johansson,
        basic_method_return,
        basic_method_coupon_adjusted_return,
        errors,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "elapsed_years": elapsed.to_string(),
        "face_value": "100",
        "coupon_frequency": 1,
        "error_units": "percentage points, exact minus approximation",
    });

    Ok(with_metadata(
        "Exact vs Johansson's Method vs Basic Method",
        &assumptions,
        warnings,
        elapsed_us,
        output,
    ))
}

/// (exact - approximate) * 100, in percentage points.
pub(crate) fn approximation_error(exact: Rate, approximate: Rate) -> BondReturnResult<PercentagePoints> {
    checked(
        exact
            .checked_sub(approximate)
            .and_then(|e| e.checked_mul(PERCENT)),
        || format!("error of {approximate} against {exact}"),
    )
}
