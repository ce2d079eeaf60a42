use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BondReturnError;
use crate::time_value;
use crate::types::{CashFlow, Money, Rate, Years};
use crate::BondReturnResult;

/// Face value every bond in this crate redeems at.
pub const FACE_VALUE: Money = dec!(100);

/// Ordered (time, amount) cash flows of a bond, earliest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    pub flows: Vec<CashFlow>,
}

/// A schedule after time has passed: what is still owed and what was paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolledSchedule {
    pub remaining: CashFlowSchedule,
    /// Sum of the cash flows whose time fell inside the elapsed period
    pub paid: Money,
}

impl CashFlowSchedule {
    /// Annual coupons of `coupon_rate * 100` for periods `1..=maturity_years`,
    /// with the face value added to the last one.
    pub fn bullet(maturity_years: u32, coupon_rate: Rate) -> BondReturnResult<Self> {
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

        let coupon = coupon_rate.checked_mul(FACE_VALUE);
        // every partial sum of the schedule must stay representable
        let total = coupon
            .and_then(|c| c.checked_mul(Decimal::from(maturity_years)))
            .and_then(|c| c.checked_add(FACE_VALUE));
        let coupon = match (coupon, total) {
            (Some(c), Some(_)) => c,
            _ => {
                return Err(BondReturnError::InvalidInput {
                    field: "coupon_rate".into(),
                    reason: format!("Coupon rate {coupon_rate} is too large to represent."),
                })
            }
        };
        let flows = (1..=maturity_years)
            .map(|t| CashFlow {
                time: Decimal::from(t),
                amount: if t == maturity_years {
                    coupon + FACE_VALUE
                } else {
                    coupon
                },
            })
            .collect();

        Ok(Self { flows })
    }

    /// Shift every time back by `elapsed`. Flows landing at or before zero
    /// have been paid and move into `paid`.
    pub fn roll_forward(&self, elapsed: Years) -> RolledSchedule {
        let mut remaining = Vec::with_capacity(self.flows.len());
        let mut paid = Decimal::ZERO;

        for cf in &self.flows {
            let time = cf.time - elapsed;
            if time > Decimal::ZERO {
                remaining.push(CashFlow {
                    time,
                    amount: cf.amount,
                });
            } else {
                paid += cf.amount;
            }
        }

        RolledSchedule {
            remaining: CashFlowSchedule { flows: remaining },
            paid,
        }
    }

    /// Price at a flat annual yield.
    pub fn price(&self, yield_rate: Rate) -> BondReturnResult<Money> {
        time_value::present_value(yield_rate, &self.flows)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
