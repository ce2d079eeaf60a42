//! Holding-period returns of annual-coupon bullet bonds, repriced exactly and
//! approximated from duration and convexity.

pub mod approximation;
pub mod comparison;
pub mod exact;
pub mod risk;
pub mod scenario;
pub mod schedule;
pub mod sweep;
