use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::BondReturnError;
use crate::types::{CashFlow, Money, Rate, Years};
use crate::BondReturnResult;

const DAYS_PER_YEAR_30_360: Decimal = dec!(360);

/// Series cut-off for `exp`; the library default stops near 1e-7.
pub(crate) const EXP_TOLERANCE: Decimal = dec!(0.0000000000000000000001);

/// Compounding factor (1 + rate)^time.
///
/// Whole-year times use exact integer powers; fractional times go through
/// exp(t * ln(1 + rate)).
pub fn compound_factor(rate: Rate, time: Years) -> BondReturnResult<Decimal> {
    if rate <= dec!(-1) {
        return Err(BondReturnError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = checked(Decimal::ONE.checked_add(rate), || format!("1 + {rate}"))?;
    let factor = if time.fract().is_zero() {
        let periods = time.to_i64().ok_or_else(|| BondReturnError::InvalidInput {
            field: "time".into(),
            reason: format!("Time {time} is out of range"),
        })?;
        one_plus_r.checked_powi(periods)
    } else {
        one_plus_r
            .checked_ln()
            .and_then(|ln| ln.checked_mul(time))
            .and_then(|x| x.checked_exp_with_tolerance(EXP_TOLERANCE))
    };

    match factor {
        Some(f) if f.is_zero() => Err(BondReturnError::FinancialImpossibility(format!(
            "(1 + {rate})^{time} underflows decimal precision"
        ))),
        Some(f) => Ok(f),
        None => Err(BondReturnError::FinancialImpossibility(format!(
            "(1 + {rate})^{time} overflows decimal precision"
        ))),
    }
}

/// `amount` discounted from `time` back to today at `rate`.
pub fn discount(amount: Money, rate: Rate, time: Years) -> BondReturnResult<Money> {
    let factor = compound_factor(rate, time)?;
    checked(amount.checked_div(factor), || {
        format!("{amount} discounted at {rate} for {time} years")
    })
}

/// Present value of a cash flow schedule at a single flat annual yield.
pub fn present_value(rate: Rate, flows: &[CashFlow]) -> BondReturnResult<Money> {
    let mut result = Decimal::ZERO;

    for cf in flows {
        let pv = discount(cf.amount, rate, cf.time)?;
        result = checked(result.checked_add(pv), || "present value".to_string())?;
    }

    Ok(result)
}

/// Lift a checked decimal operation, naming the quantity that left the
/// representable range.
pub(crate) fn checked(
    value: Option<Decimal>,
    what: impl FnOnce() -> String,
) -> BondReturnResult<Decimal> {
    value.ok_or_else(|| {
        BondReturnError::FinancialImpossibility(format!(
            "{} exceeds decimal precision",
            what()
        ))
    })
}

/// Year fraction between two dates under the 30/360 (bond basis) convention.
pub fn year_fraction_30_360(start: NaiveDate, end: NaiveDate) -> BondReturnResult<Years> {
    if end < start {
        return Err(BondReturnError::DateError(format!(
            "horizon end {end} is before start {start}"
        )));
    }

    let d1 = start.day().min(30);
    let d2 = if d1 == 30 && end.day() == 31 {
        30
    } else {
        end.day()
    };

    let days = 360 * (end.year() - start.year())
        + 30 * (end.month() as i32 - start.month() as i32)
        + (d2 as i32 - d1 as i32);

    Ok(Decimal::from(days) / DAYS_PER_YEAR_30_360)
}
