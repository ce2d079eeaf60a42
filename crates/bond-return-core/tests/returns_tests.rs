use bond_return_core::fixed_income::approximation::{self, johansson_from_risk};
use bond_return_core::fixed_income::comparison::compare_methods;
use bond_return_core::fixed_income::exact::{self, calculate_exact_return};
use bond_return_core::fixed_income::risk::{calculate_risk, risk_measures, RiskInput};
use bond_return_core::fixed_income::scenario::BondReturnInput;
use bond_return_core::fixed_income::schedule::CashFlowSchedule;
use bond_return_core::BondReturnError;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

// ===========================================================================
// Worked examples: 5y 4% annual bond priced at par
// ===========================================================================

fn five_year_par(shifted_yield: Decimal) -> BondReturnInput {
    BondReturnInput::new(5, dec!(0.04), dec!(0.04), shifted_yield)
}

#[test]
fn test_par_bond_duration_and_convexity() {
    let out = calculate_risk(&RiskInput {
        maturity_years: 5,
        coupon_rate: dec!(0.04),
        yield_rate: dec!(0.04),
    })
    .unwrap();

    // ModDur 4.45, convexity 25.01
    assert_eq!(out.result.modified_duration.round_dp(2), dec!(4.45));
    assert_eq!(out.result.convexity.round_dp(2), dec!(25.01));
}

#[test]
fn test_thirty_day_rate_rise() {
    let input = five_year_par(dec!(0.05)).with_elapsed(dec!(30) / dec!(360));
    let cmp = compare_methods(&input).unwrap().result;

    // Exact price after 30 days at 5% is 96.06, a -3.94% return
    assert_eq!(cmp.exact.horizon_price.round_dp(2), dec!(96.06));
    assert_eq!((cmp.exact.total_return * dec!(100)).round_dp(2), dec!(-3.94));

    // Basic Method: -4.33%
    assert_eq!((cmp.basic_method_return * dec!(100)).round_dp(2), dec!(-4.33));

    // Without the time-yield cross term JM reads -4.02%
    let without_cross = cmp.johansson.terms.carry
        + cmp.johansson.terms.duration
        + cmp.johansson.terms.convexity;
    let r = without_cross.exp() - Decimal::ONE;
    assert_eq!((r * dec!(100)).round_dp(2), dec!(-4.02));

    // With it, JM lands on the exact figure to the displayed precision
    assert_eq!((cmp.johansson.total_return * dec!(100)).round_dp(2), dec!(-3.94));
}

#[test]
fn test_implied_forward_realized_over_one_year() {
    let cmp = compare_methods(&five_year_par(dec!(0.050228))).unwrap().result;

    // Remaining flows are worth 96.3752; with the 4 coupon the return is 0.3752%
    assert_eq!(cmp.exact.horizon_price.round_dp(4), dec!(96.3751));
    assert_eq!((cmp.exact.total_return * dec!(100)).round_dp(4), dec!(0.3751));

    // Basic Method with the coupon added back: -0.4225%
    assert_eq!(
        (cmp.basic_method_coupon_adjusted_return * dec!(100)).round_dp(4),
        dec!(-0.4225)
    );

    // JM stays within a few bps; the Basic Method misses by ~80bps
    assert!(cmp.errors.johansson.abs() < dec!(0.05));
    assert!(cmp.errors.basic_method_coupon_adjusted.abs() > dec!(0.75));
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_unchanged_yield_gives_zero_error_for_every_coupon() {
    for coupon in [dec!(0), dec!(0.05), dec!(0.10), dec!(0.15), dec!(0.20)] {
        let input = BondReturnInput::new(5, coupon, dec!(0.04), dec!(0.04));
        let cmp = compare_methods(&input).unwrap().result;

        assert!((cmp.exact.total_return - dec!(0.04)).abs() < dec!(0.000000000001));
        assert!((cmp.johansson.total_return - dec!(0.04)).abs() < dec!(0.000000000001));
        assert!(cmp.errors.johansson.abs() < dec!(0.0000000001));
    }
}

#[test]
fn test_par_bond_unchanged_yield_earns_its_coupon() {
    let cmp = compare_methods(&five_year_par(dec!(0.04))).unwrap().result;
    assert!((cmp.exact.total_return - dec!(0.04)).abs() < dec!(0.000000000001));
}

#[test]
fn test_zero_coupon_duration_and_convexity_closed_form() {
    let y0 = dec!(0.04);
    let schedule = CashFlowSchedule::bullet(5, Decimal::ZERO).unwrap();
    let m = risk_measures(&schedule, y0).unwrap();
    let one_plus_y = Decimal::ONE + y0;

    // Macaulay duration = T, undeflated convexity = T(T+1)
    assert!((m.macaulay_duration - dec!(5)).abs() < dec!(0.0000000001));
    assert!((m.modified_duration * one_plus_y - dec!(5)).abs() < dec!(0.0000000001));
    assert!((m.convexity * one_plus_y * one_plus_y - dec!(30)).abs() < dec!(0.0000000001));

    // Single discounted flow: 100 / 1.04^5
    let direct = dec!(100) / one_plus_y.powi(5);
    assert!((m.price - direct).abs() < dec!(0.0000000001));
}

#[test]
fn test_round_trip_own_risk_measures_no_shift() {
    let schedule = CashFlowSchedule::bullet(7, dec!(0.06)).unwrap();
    let m = risk_measures(&schedule, dec!(0.05)).unwrap();
    let out =
        johansson_from_risk(m.modified_duration, m.convexity, dec!(0.05), Decimal::ZERO, Decimal::ZERO)
            .unwrap();
    assert_eq!(out.total_return, Decimal::ZERO);
}

#[test]
fn test_error_grows_with_shift_size() {
    for coupon in [dec!(0), dec!(0.05), dec!(0.10), dec!(0.15), dec!(0.20)] {
        for direction in [Decimal::ONE, -Decimal::ONE] {
            let mut previous = Decimal::ZERO;
            for step in 0..=24 {
                let shift = direction * dec!(0.0025) * Decimal::from(step);
                let y1 = dec!(0.04) + shift;
                let exact = exact::exact_return(5, coupon, dec!(0.04), y1, Decimal::ONE).unwrap();
                let approx =
                    approximation::approximate_return(5, coupon, dec!(0.04), y1, Decimal::ONE).unwrap();
                let error = (exact.total_return - approx.total_return).abs();
                assert!(
                    error >= previous,
                    "coupon {coupon}, shift {shift}: {error} < {previous}"
                );
                previous = error;
            }
        }
    }
}

// ===========================================================================
// Failure modes
// ===========================================================================

#[test]
fn test_horizon_reaching_maturity_is_reported() {
    let input = BondReturnInput::new(1, dec!(0.04), dec!(0.04), dec!(0.05));
    match calculate_exact_return(&input) {
        Err(BondReturnError::EmptyScheduleAfterHorizon { maturity, elapsed }) => {
            assert_eq!(maturity, 1);
            assert_eq!(elapsed, Decimal::ONE);
        }
        other => panic!("expected EmptyScheduleAfterHorizon, got {other:?}"),
    }
}

#[test]
fn test_invalid_inputs_fail_fast() {
    let zero_maturity = BondReturnInput::new(0, dec!(0.04), dec!(0.04), dec!(0.05));
    assert!(matches!(
        compare_methods(&zero_maturity),
        Err(BondReturnError::InvalidInput { .. })
    ));

    let negative_coupon = BondReturnInput::new(5, dec!(-0.01), dec!(0.04), dec!(0.05));
    assert!(compare_methods(&negative_coupon).is_err());

    let yield_below_floor = BondReturnInput::new(5, dec!(0.04), dec!(0.04), dec!(-1.2));
    assert!(compare_methods(&yield_below_floor).is_err());
}

#[test]
fn test_deep_negative_yield_on_long_bond_is_an_error_not_a_panic() {
    let risk = calculate_risk(&RiskInput {
        maturity_years: 30,
        coupon_rate: dec!(0.04),
        yield_rate: dec!(-0.9),
    });
    assert!(matches!(risk, Err(BondReturnError::FinancialImpossibility(_))));

    let exact = exact::exact_return(30, dec!(0.04), dec!(-0.9), dec!(0.04), Decimal::ONE);
    assert!(matches!(exact, Err(BondReturnError::FinancialImpossibility(_))));

    let input = BondReturnInput::new(30, dec!(0.04), dec!(-0.9), dec!(0.04));
    assert!(matches!(
        compare_methods(&input),
        Err(BondReturnError::FinancialImpossibility(_))
    ));
}

#[test]
fn test_extreme_shifted_yield_is_an_error_not_a_panic() {
    let huge = dec!(1000000000000000);
    let approx = approximation::approximate_return(5, dec!(0.04), dec!(0.04), huge, Decimal::ONE);
    assert!(matches!(approx, Err(BondReturnError::FinancialImpossibility(_))));

    let input = BondReturnInput::new(5, dec!(0.04), dec!(0.04), huge);
    assert!(matches!(
        compare_methods(&input),
        Err(BondReturnError::FinancialImpossibility(_))
    ));
}
