use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BondReturnError;
use crate::time_value::{checked, year_fraction_30_360};
use crate::types::{Rate, Years};
use crate::BondReturnResult;

/// Horizon used when neither `elapsed_years` nor horizon dates are given.
pub const DEFAULT_ELAPSED_YEARS: Years = Decimal::ONE;

/// A bond and the yield move it experiences over a holding period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondReturnInput {
    /// Whole years to maturity (>= 1)
    pub maturity_years: u32,
    /// Annual coupon rate as a decimal (0.04 = 4%)
    pub coupon_rate: Rate,
    /// Yield at the start of the holding period
    pub initial_yield: Rate,
    /// Yield at the end of the holding period
    pub shifted_yield: Rate,
    /// Holding period in years; defaults to one year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_years: Option<Years>,
    /// Start of the holding period (30/360), used with `horizon_end`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_start: Option<NaiveDate>,
    /// End of the holding period (30/360), used with `horizon_start`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_end: Option<NaiveDate>,
}

impl BondReturnInput {
    pub fn new(maturity_years: u32, coupon_rate: Rate, initial_yield: Rate, shifted_yield: Rate) -> Self {
        Self {
            maturity_years,
            coupon_rate,
            initial_yield,
            shifted_yield,
            elapsed_years: None,
            horizon_start: None,
            horizon_end: None,
        }
    }

    pub fn with_elapsed(mut self, elapsed_years: Years) -> Self {
        self.elapsed_years = Some(elapsed_years);
        self
    }

    /// y1 - y0
    pub fn yield_shift(&self) -> BondReturnResult<Rate> {
        checked_yield_shift(self.initial_yield, self.shifted_yield)
    }

    /// Holding period in years. An explicit `elapsed_years` wins over dates.
    pub fn elapsed(&self) -> BondReturnResult<Years> {
        let elapsed = match (self.elapsed_years, self.horizon_start, self.horizon_end) {
            (Some(dt), _, _) => dt,
            (None, Some(start), Some(end)) => year_fraction_30_360(start, end)?,
            (None, None, None) => DEFAULT_ELAPSED_YEARS,
            _ => {
                return Err(BondReturnError::InvalidInput {
                    field: "horizon_start/horizon_end".into(),
                    reason: "Both horizon dates must be given together.".into(),
                })
            }
        };
        validate_elapsed(elapsed)?;
        Ok(elapsed)
    }

    pub fn validate(&self) -> BondReturnResult<()> {
        validate_bond(self.maturity_years, self.coupon_rate)?;
        validate_yield("initial_yield", self.initial_yield)?;
        validate_yield("shifted_yield", self.shifted_yield)?;
        Ok(())
    }
}

pub(crate) fn validate_bond(maturity_years: u32, coupon_rate: Rate) -> BondReturnResult<()> {
    if maturity_years == 0 {
        return Err(BondReturnError::InvalidInput {
            field: "maturity_years".into(),
            reason: "Maturity must be at least one year.".into(),
        });
    }
    if coupon_rate < Decimal::ZERO {
        return Err(BondReturnError::InvalidInput {
            field: "coupon_rate".into(),
            reason: "Coupon rate must be non-negative.".into(),
        });
    }
    Ok(())
}

pub(crate) fn validate_yield(field: &str, yield_rate: Rate) -> BondReturnResult<()> {
    if yield_rate <= dec!(-1) {
        return Err(BondReturnError::InvalidInput {
            field: field.into(),
            reason: "Yield must be greater than -1 (i.e. > -100%).".into(),
        });
    }
    Ok(())
}

pub(crate) fn checked_yield_shift(initial_yield: Rate, shifted_yield: Rate) -> BondReturnResult<Rate> {
    checked(shifted_yield.checked_sub(initial_yield), || {
        format!("yield shift from {initial_yield} to {shifted_yield}")
    })
}

pub(crate) fn validate_elapsed(elapsed: Years) -> BondReturnResult<()> {
    if elapsed < Decimal::ZERO {
        return Err(BondReturnError::InvalidInput {
            field: "elapsed_years".into(),
            reason: "Elapsed time must be non-negative.".into(),
        });
    }
    Ok(())
}

/// Elapsed time must leave at least one cash flow to discount.
pub(crate) fn validate_horizon(maturity_years: u32, elapsed: Years) -> BondReturnResult<()> {
    if Decimal::from(maturity_years) <= elapsed {
        return Err(BondReturnError::EmptyScheduleAfterHorizon {
            maturity: maturity_years,
            elapsed,
        });
    }
    Ok(())
}
