use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BondReturnError;
use crate::fixed_income::scenario::{validate_bond, validate_yield};
use crate::fixed_income::schedule::CashFlowSchedule;
use crate::time_value::{checked, discount};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::BondReturnResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for price, duration and convexity of an annual-coupon
/// bullet bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskInput {
    /// Whole years to maturity (>= 1)
    pub maturity_years: u32,
    /// Annual coupon rate as a decimal (0.05 = 5%)
    pub coupon_rate: Rate,
    /// Flat annual yield the bond is priced at
    pub yield_rate: Rate,
}

/// Price and yield sensitivities at a single yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMeasures {
    /// Present value of all cash flows per 100 face
    pub price: Money,
    /// Present-value-weighted average time of the cash flows (years)
    pub macaulay_duration: Decimal,
    /// Macaulay duration / (1 + y)
    pub modified_duration: Decimal,
    /// sum[(t^2 + t) * PV_t] / (P * (1 + y)^2)
    pub convexity: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price, Macaulay and modified duration, and convexity of a bullet bond.
pub fn calculate_risk(input: &RiskInput) -> BondReturnResult<ComputationOutput<RiskMeasures>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_bond(input.maturity_years, input.coupon_rate)?;
    validate_yield("yield_rate", input.yield_rate)?;

    let schedule = CashFlowSchedule::bullet(input.maturity_years, input.coupon_rate)?;
    let output = risk_measures(&schedule, input.yield_rate)?;

    if input.yield_rate < Decimal::ZERO {
        warnings.push("Negative yield: bond trades above the sum of its cash flows.".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "coupon_frequency": 1,
        "face_value": "100",
        "compounding": "annual",
        "convexity_convention": "discrete, (t^2 + t) weights",
    });

    Ok(with_metadata(
        "Bullet Bond Duration & Convexity (annual compounding)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Compute risk measures of `schedule` at a flat yield.
pub fn risk_measures(schedule: &CashFlowSchedule, yield_rate: Rate) -> BondReturnResult<RiskMeasures> {
    validate_yield("yield_rate", yield_rate)?;

    let mut price = Decimal::ZERO;
    let mut time_weighted = Decimal::ZERO;
    let mut convexity_weighted = Decimal::ZERO;

    for cf in &schedule.flows {
        let pv_cf = discount(cf.amount, yield_rate, cf.time)?;
        let overflow = || format!("risk measures at yield {yield_rate}");
        price = checked(price.checked_add(pv_cf), overflow)?;
        time_weighted = checked(
            cf.time.checked_mul(pv_cf).and_then(|w| time_weighted.checked_add(w)),
            overflow,
        )?;
        convexity_weighted = checked(
            (cf.time * cf.time + cf.time)
                .checked_mul(pv_cf)
                .and_then(|w| convexity_weighted.checked_add(w)),
            overflow,
        )?;
    }

    if price.is_zero() {
        return Err(BondReturnError::DivisionByZero {
            context: "risk measures: bond price is zero".to_string(),
        });
    }

    let one_plus_y = checked(Decimal::ONE.checked_add(yield_rate), || format!("1 + {yield_rate}"))?;
    let macaulay_duration = time_weighted / price;

    let convexity = checked(
        price
            .checked_mul(one_plus_y)
            .and_then(|d| d.checked_mul(one_plus_y))
            .and_then(|d| convexity_weighted.checked_div(d)),
        || format!("convexity at yield {yield_rate}"),
    )?;

    Ok(RiskMeasures {
        price,
        macaulay_duration,
        modified_duration: checked(macaulay_duration.checked_div(one_plus_y), || {
            format!("modified duration at yield {yield_rate}")
        })?,
        convexity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn five_year_par() -> RiskInput {
        RiskInput {
            maturity_years: 5,
            coupon_rate: dec!(0.04),
            yield_rate: dec!(0.04),
        }
    }

    #[test]
    fn test_five_year_par_bond_measures() {
        let out = calculate_risk(&five_year_par()).unwrap().result;
        assert!((out.price - dec!(100)).abs() < dec!(0.000001));
        assert!((out.modified_duration - dec!(4.4518)).abs() < dec!(0.0001));
        assert!((out.convexity - dec!(25.0125)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_zero_coupon_duration_equals_maturity() {
        let schedule = CashFlowSchedule::bullet(7, Decimal::ZERO).unwrap();
        let m = risk_measures(&schedule, dec!(0.03)).unwrap();
        assert!((m.macaulay_duration - dec!(7)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_higher_coupon_shortens_duration() {
        let low = risk_measures(&CashFlowSchedule::bullet(10, dec!(0.01)).unwrap(), dec!(0.05)).unwrap();
        let high = risk_measures(&CashFlowSchedule::bullet(10, dec!(0.10)).unwrap(), dec!(0.05)).unwrap();
        assert!(high.modified_duration < low.modified_duration);
    }

    #[test]
    fn test_negative_yield_warns() {
        let mut input = five_year_par();
        input.yield_rate = dec!(-0.01);
        let out = calculate_risk(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.result.price > dec!(100));
    }

    #[test]
    fn test_deep_negative_yield_long_bond_is_an_error() {
        let input = RiskInput {
            maturity_years: 30,
            coupon_rate: dec!(0.04),
            yield_rate: dec!(-0.9),
        };
        assert!(matches!(
            calculate_risk(&input),
            Err(BondReturnError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_century_bond_at_minus_half_is_an_error() {
        let schedule = CashFlowSchedule::bullet(100, dec!(0.04)).unwrap();
        assert!(matches!(
            risk_measures(&schedule, dec!(-0.5)),
            Err(BondReturnError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_invalid_yield_rejected() {
        let mut input = five_year_par();
        input.yield_rate = dec!(-1.5);
        assert!(matches!(
            calculate_risk(&input),
            Err(BondReturnError::InvalidInput { .. })
        ));
    }
}
