use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BondReturnError;
use crate::fixed_income::risk::risk_measures;
use crate::fixed_income::scenario::{
    checked_yield_shift, validate_bond, validate_elapsed, validate_yield, BondReturnInput,
};
use crate::fixed_income::schedule::CashFlowSchedule;
use crate::time_value::{checked, EXP_TOLERANCE};
use crate::types::{with_metadata, ComputationOutput, Rate, Years};
use crate::BondReturnResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The four contributions to the continuously compounded return R_c of
/// Johansson's Method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JohanssonTerms {
    /// ln(1 + y0) * dt
    pub carry: Decimal,
    /// -ModDur * dy
    pub duration: Decimal,
    /// 0.5 * (Convexity - ModDur^2) * dy^2
    pub convexity: Decimal,
    /// dy * dt / (1 + y0)
    pub time_yield: Decimal,
}

impl JohanssonTerms {
    pub fn continuous_return(&self) -> Rate {
        self.carry + self.duration + self.convexity + self.time_yield
    }
}

/// Second-order return approximations from duration and convexity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproximateReturnOutput {
    pub modified_duration: Decimal,
    pub convexity: Decimal,
    /// y1 - y0
    pub yield_shift: Rate,
    pub terms: JohanssonTerms,
    /// R_c, the sum of `terms`
    pub continuous_return: Rate,
    /// exp(R_c) - 1
    pub total_return: Rate,
    /// -ModDur * dy + 0.5 * Convexity * dy^2, ignoring the passage of time
    pub basic_method_return: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Approximate holding-period return using Johansson's Method, alongside the
/// Basic Method for reference.
pub fn calculate_approximate_return(
    input: &BondReturnInput,
) -> BondReturnResult<ComputationOutput<ApproximateReturnOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.validate()?;
    let elapsed = input.elapsed()?;

    let output = approximate_return(
        input.maturity_years,
        input.coupon_rate,
        input.initial_yield,
        input.shifted_yield,
        elapsed,
    )?;

    if output.yield_shift.abs() > dec!(0.05) {
        warnings.push(format!(
            "Yield shift of {} is large for a second-order expansion; expect growing error.",
            output.yield_shift
        ));
    }
    if Decimal::from(input.maturity_years) <= elapsed {
        warnings.push("Horizon reaches maturity; the expansion has no cash flows left to describe.".into());
    }

    let elapsed_us = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "elapsed_years": elapsed.to_string(),
        "risk_measures_at": "initial yield",
        "expansion": "second order in yield, first order in time",
    });

    Ok(with_metadata(
        "Johansson's Method (Taylor expansion in yield and time)",
        &assumptions,
        warnings,
        elapsed_us,
        output,
    ))
}

/// Approximate return of a bullet bond, deriving duration and convexity from
/// its schedule at `initial_yield`.
pub fn approximate_return(
    maturity_years: u32,
    coupon_rate: Rate,
    initial_yield: Rate,
    shifted_yield: Rate,
    elapsed: Years,
) -> BondReturnResult<ApproximateReturnOutput> {
    validate_bond(maturity_years, coupon_rate)?;
    validate_yield("shifted_yield", shifted_yield)?;

    let schedule = CashFlowSchedule::bullet(maturity_years, coupon_rate)?;
    let risk = risk_measures(&schedule, initial_yield)?;

    johansson_from_risk(
        risk.modified_duration,
        risk.convexity,
        initial_yield,
        checked_yield_shift(initial_yield, shifted_yield)?,
        elapsed,
    )
}

/// Johansson's Method given precomputed modified duration and convexity.
pub fn johansson_from_risk(
    modified_duration: Decimal,
    convexity: Decimal,
    initial_yield: Rate,
    yield_shift: Rate,
    elapsed: Years,
) -> BondReturnResult<ApproximateReturnOutput> {
    validate_yield("initial_yield", initial_yield)?;
    validate_elapsed(elapsed)?;

    let one_plus_y = checked(Decimal::ONE.checked_add(initial_yield), || {
        format!("1 + {initial_yield}")
    })?;
    let theta = one_plus_y.checked_ln().ok_or_else(|| BondReturnError::InvalidInput {
        field: "initial_yield".into(),
        reason: "ln(1 + y0) is undefined".into(),
    })?;

    let term = |name: &str, value: Option<Decimal>| {
        checked(value, || format!("{name} term for a yield shift of {yield_shift}"))
    };
    let dispersion = modified_duration
        .checked_mul(modified_duration)
        .and_then(|md_sq| convexity.checked_sub(md_sq));
    let terms = JohanssonTerms {
        carry: term("carry", theta.checked_mul(elapsed))?,
        duration: term("duration", (-modified_duration).checked_mul(yield_shift))?,
        convexity: term(
            "convexity",
            dispersion
                .and_then(|d| d.checked_mul(yield_shift))
                .and_then(|d| d.checked_mul(yield_shift))
                .and_then(|d| d.checked_mul(dec!(0.5))),
        )?,
        time_yield: term(
            "time-yield",
            yield_shift
                .checked_mul(elapsed)
                .and_then(|x| x.checked_div(one_plus_y)),
        )?,
    };
    let continuous_return = term(
        "continuous return",
        terms
            .carry
            .checked_add(terms.duration)
            .and_then(|x| x.checked_add(terms.convexity))
            .and_then(|x| x.checked_add(terms.time_yield)),
    )?;

    let growth = continuous_return
        .checked_exp_with_tolerance(EXP_TOLERANCE)
        .ok_or_else(|| {
            BondReturnError::FinancialImpossibility(format!(
                "exp({continuous_return}) overflows decimal precision"
            ))
        })?;

    Ok(ApproximateReturnOutput {
        modified_duration,
        convexity,
        yield_shift,
        terms,
        continuous_return,
        total_return: growth - Decimal::ONE,
        basic_method_return: basic_method_return(modified_duration, convexity, yield_shift)?,
    })
}

/// Instantaneous price change from duration and convexity alone.
pub fn basic_method_return(
    modified_duration: Decimal,
    convexity: Decimal,
    yield_shift: Rate,
) -> BondReturnResult<Rate> {
    let convexity_term = convexity
        .checked_mul(yield_shift)
        .and_then(|x| x.checked_mul(yield_shift))
        .and_then(|x| x.checked_mul(dec!(0.5)));
    checked(
        (-modified_duration)
            .checked_mul(yield_shift)
            .zip(convexity_term)
            .and_then(|(d, c)| d.checked_add(c)),
        || format!("Basic Method return for a yield shift of {yield_shift}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_basic_method_five_year_par() {
        let out = approximate_return(5, dec!(0.04), dec!(0.04), dec!(0.05), Decimal::ONE).unwrap();
        assert!((out.basic_method_return - dec!(-0.043268)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_one_year_johansson_close_to_exact() {
        // exact is 0.45405%
        let out = approximate_return(5, dec!(0.04), dec!(0.04), dec!(0.05), Decimal::ONE).unwrap();
        assert!((out.total_return - dec!(0.0045881)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_terms_sum_to_continuous_return() {
        let out = approximate_return(10, dec!(0.06), dec!(0.03), dec!(0.045), dec!(0.5)).unwrap();
        assert_eq!(out.terms.continuous_return(), out.continuous_return);
        assert!(out.terms.duration < Decimal::ZERO);
        assert!(out.terms.time_yield > Decimal::ZERO);
    }

    #[test]
    fn test_no_shift_no_time_is_zero_return() {
        let out = johansson_from_risk(dec!(4.45), dec!(25.01), dec!(0.04), Decimal::ZERO, Decimal::ZERO)
            .unwrap();
        assert_eq!(out.continuous_return, Decimal::ZERO);
        assert_eq!(out.total_return, Decimal::ZERO);
        assert_eq!(out.basic_method_return, Decimal::ZERO);
    }

    #[test]
    fn test_no_shift_one_year_earns_the_yield() {
        let out = approximate_return(5, dec!(0.10), dec!(0.04), dec!(0.04), Decimal::ONE).unwrap();
        assert!((out.total_return - dec!(0.04)).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_large_shift_warns() {
        let input = BondReturnInput::new(5, dec!(0.04), dec!(0.04), dec!(0.12));
        let out = calculate_approximate_return(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("large")));
    }

    #[test]
    fn test_rejects_negative_elapsed() {
        assert!(johansson_from_risk(dec!(4), dec!(20), dec!(0.04), dec!(0.01), dec!(-1)).is_err());
    }

    #[test]
    fn test_extreme_shift_reports_overflow() {
        let err = approximate_return(5, dec!(0.04), dec!(0.04), dec!(1000000000000000), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, BondReturnError::FinancialImpossibility(_)));
    }

    #[test]
    fn test_basic_method_overflow_is_an_error() {
        assert!(basic_method_return(dec!(4.45), dec!(25.01), dec!(1000000000000000)).is_err());
    }
}
