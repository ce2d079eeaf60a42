use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BondReturnError;
use crate::fixed_income::approximation::johansson_from_risk;
use crate::fixed_income::comparison::approximation_error;
use crate::fixed_income::exact::exact_return_after_roll;
use crate::fixed_income::risk::risk_measures;
use crate::fixed_income::scenario::{
    checked_yield_shift, validate_bond, validate_elapsed, validate_horizon, validate_yield,
};
use crate::fixed_income::schedule::CashFlowSchedule;
use crate::types::{with_metadata, ComputationOutput, PercentagePoints, Rate, Years};
use crate::BondReturnResult;

const PERCENT: Decimal = dec!(100);

/// Upper bound on the points a single axis may expand to.
pub const MAX_AXIS_POINTS: usize = 100_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One axis of the sweep, either generated or listed explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridAxis {
    /// `points` evenly spaced values from `start` to `end` inclusive
    Linspace { start: Rate, end: Rate, points: u32 },
    /// `start`, `start + step`, ... up to and including `end`
    Stepped { start: Rate, end: Rate, step: Rate },
    /// Explicit strictly ascending values
    Values { values: Vec<Rate> },
}

/// Inputs of the approximation-error sweep. Every field has a default
/// matching the published chart: a 5y bond at 4%, one-year horizon, coupons
/// 0%..20% in five points, yields -2%..10% in basis-point steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSweepInput {
    #[serde(default = "default_maturity")]
    pub maturity_years: u32,
    #[serde(default = "default_base_yield")]
    pub base_yield: Rate,
    #[serde(default = "default_elapsed")]
    pub elapsed_years: Years,
    #[serde(default = "GridAxis::default_coupons")]
    pub coupon_axis: GridAxis,
    #[serde(default = "GridAxis::default_yields")]
    pub yield_axis: GridAxis,
}

/// Approximation errors laid out rows = yield levels, columns = coupons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorGrid {
    pub maturity_years: u32,
    pub base_yield: Rate,
    pub elapsed_years: Years,
    pub coupons: Vec<Rate>,
    pub yields: Vec<Rate>,
    /// `yields` recentered on the base yield
    pub yield_shifts: Vec<Rate>,
    /// errors[yield_index][coupon_index], (exact - JM) * 100
    pub errors: Vec<Vec<PercentagePoints>>,
}

/// One line of the chart: a single coupon across every yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSeries {
    pub coupon_rate: Rate,
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: Rate,
    pub error: PercentagePoints,
}

/// Location of the largest absolute error in the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridExtreme {
    pub coupon_rate: Rate,
    pub yield_level: Rate,
    pub error: PercentagePoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSweepOutput {
    pub grid: ErrorGrid,
    pub max_abs_error: Option<GridExtreme>,
}

fn default_maturity() -> u32 {
    5
}

fn default_base_yield() -> Rate {
    dec!(0.04)
}

fn default_elapsed() -> Years {
    Decimal::ONE
}

impl Default for ErrorSweepInput {
    fn default() -> Self {
        Self {
            maturity_years: default_maturity(),
            base_yield: default_base_yield(),
            elapsed_years: default_elapsed(),
            coupon_axis: GridAxis::default_coupons(),
            yield_axis: GridAxis::default_yields(),
        }
    }
}

impl GridAxis {
    pub fn default_coupons() -> Self {
        GridAxis::Linspace {
            start: Decimal::ZERO,
            end: dec!(0.20),
            points: 5,
        }
    }

    pub fn default_yields() -> Self {
        GridAxis::Stepped {
            start: dec!(-0.02),
            end: dec!(0.10),
            step: dec!(0.0001),
        }
    }

    /// Expand the axis into its values. `field` names the axis in errors.
    pub fn values(&self, field: &str) -> BondReturnResult<Vec<Rate>> {
        let invalid = |reason: String| BondReturnError::InvalidInput {
            field: field.into(),
            reason,
        };

        match self {
            GridAxis::Linspace { start, end, points } => {
                if *points == 0 {
                    return Err(invalid("An axis needs at least one point.".into()));
                }
                if end < start {
                    return Err(invalid("Axis end must not be below its start.".into()));
                }
                let n = *points as usize;
                if n > MAX_AXIS_POINTS {
                    return Err(invalid(format!("Axis exceeds {MAX_AXIS_POINTS} points.")));
                }
                if n == 1 {
                    return Ok(vec![*start]);
                }
                let step = end
                    .checked_sub(*start)
                    .and_then(|span| span.checked_div(Decimal::from(n - 1)))
                    .ok_or_else(|| invalid("Axis span is too wide to represent.".into()))?;
                let mut values: Vec<Rate> = (0..n - 1)
                    .map(|i| start + step * Decimal::from(i))
                    .collect();
                values.push(*end);
                Ok(values)
            }
            GridAxis::Stepped { start, end, step } => {
                if *step <= Decimal::ZERO {
                    return Err(invalid("Axis step must be positive.".into()));
                }
                if end < start {
                    return Err(invalid("Axis end must not be below its start.".into()));
                }
                let intervals = end
                    .checked_sub(*start)
                    .and_then(|span| span.checked_div(*step))
                    .and_then(|n| n.floor().to_usize())
                    .filter(|n| *n < MAX_AXIS_POINTS)
                    .ok_or_else(|| invalid(format!("Axis exceeds {MAX_AXIS_POINTS} points.")))?;
                Ok((0..=intervals)
                    .map(|i| start + step * Decimal::from(i))
                    .collect())
            }
            GridAxis::Values { values } => {
                if values.is_empty() {
                    return Err(invalid("An axis needs at least one point.".into()));
                }
                if values.len() > MAX_AXIS_POINTS {
                    return Err(invalid(format!("Axis exceeds {MAX_AXIS_POINTS} points.")));
                }
                if values.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(invalid("Axis values must be strictly ascending.".into()));
                }
                Ok(values.clone())
            }
        }
    }
}

impl ErrorGrid {
    /// (rows, columns) = (yield levels, coupons)
    pub fn shape(&self) -> (usize, usize) {
        (self.yields.len(), self.coupons.len())
    }

    pub fn cell(&self, yield_index: usize, coupon_index: usize) -> Option<PercentagePoints> {
        self.errors.get(yield_index)?.get(coupon_index).copied()
    }

    /// Column headers, coupon rates in percent (e.g. "5%").
    pub fn coupon_labels(&self) -> Vec<String> {
        self.coupons
            .iter()
            .map(|c| format!("{}%", (c * PERCENT).normalize()))
            .collect()
    }

    /// One series per coupon. `recentered` puts the yield shift on the x axis
    /// instead of the yield level.
    pub fn series(&self, recentered: bool) -> Vec<ErrorSeries> {
        let xs = if recentered {
            &self.yield_shifts
        } else {
            &self.yields
        };

        self.coupons
            .iter()
            .zip(self.coupon_labels())
            .enumerate()
            .map(|(j, (coupon, label))| ErrorSeries {
                coupon_rate: *coupon,
                label,
                points: xs
                    .iter()
                    .zip(&self.errors)
                    .map(|(x, row)| SeriesPoint {
                        x: *x,
                        error: row[j],
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn max_abs_error(&self) -> Option<GridExtreme> {
        let mut best: Option<GridExtreme> = None;
        for (i, row) in self.errors.iter().enumerate() {
            for (j, err) in row.iter().enumerate() {
                let beats = best
                    .as_ref()
                    .map_or(true, |b| err.abs() > b.error.abs());
                if beats {
                    best = Some(GridExtreme {
                        coupon_rate: self.coupons[j],
                        yield_level: self.yields[i],
                        error: *err,
                    });
                }
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Sweep the approximation error of Johansson's Method over coupons and
/// yield levels.
pub fn run_error_sweep(
    input: &ErrorSweepInput,
) -> BondReturnResult<ComputationOutput<ErrorSweepOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let coupons = input.coupon_axis.values("coupon_axis")?;
    let yields = input.yield_axis.values("yield_axis")?;

    let grid = error_grid(
        input.maturity_years,
        &coupons,
        &yields,
        input.base_yield,
        input.elapsed_years,
    )?;

    if !yields.contains(&input.base_yield) {
        warnings.push(format!(
            "Base yield {} is not on the yield axis; no zero-error row is present.",
            input.base_yield
        ));
    }

    let max_abs_error = grid.max_abs_error();
    let output = ErrorSweepOutput {
        grid,
        max_abs_error,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "maturity_years": input.maturity_years,
        "base_yield": input.base_yield.to_string(),
        "elapsed_years": input.elapsed_years.to_string(),
        "error_units": "percentage points, exact minus Johansson",
        "rows": "yield levels",
        "columns": "coupon rates",
    });

    Ok(with_metadata(
        "Johansson's Method approximation error sweep",
        &assumptions,
        warnings,
        elapsed_us,
        output,
    ))
}

/// Error grid for explicit axes. Each cell is independent of the others;
/// schedule, price and risk measures are shared per coupon column.
pub fn error_grid(
    maturity_years: u32,
    coupons: &[Rate],
    yields: &[Rate],
    base_yield: Rate,
    elapsed: Years,
) -> BondReturnResult<ErrorGrid> {
    validate_yield("base_yield", base_yield)?;
    validate_elapsed(elapsed)?;
    validate_horizon(maturity_years, elapsed)?;
    for coupon in coupons {
        validate_bond(maturity_years, *coupon)?;
    }
    for y in yields {
        validate_yield("yield_axis", *y)?;
    }

    tracing::debug!(
        maturity_years,
        coupons = coupons.len(),
        yields = yields.len(),
        "computing approximation error grid"
    );

    let yield_shifts = yields
        .iter()
        .map(|y| checked_yield_shift(base_yield, *y))
        .collect::<BondReturnResult<Vec<Rate>>>()?;
    let mut errors = vec![vec![Decimal::ZERO; coupons.len()]; yields.len()];

    for (j, coupon) in coupons.iter().enumerate() {
        let schedule = CashFlowSchedule::bullet(maturity_years, *coupon)?;
        let risk = risk_measures(&schedule, base_yield)?;
        let rolled = schedule.roll_forward(elapsed);

        for (i, y) in yields.iter().enumerate() {
            let exact = exact_return_after_roll(maturity_years, elapsed, risk.price, &rolled, *y)?;
            let approx = johansson_from_risk(
                risk.modified_duration,
                risk.convexity,
                base_yield,
                yield_shifts[i],
                elapsed,
            )?;
            errors[i][j] = approximation_error(exact.total_return, approx.total_return)?;
        }
    }

    Ok(ErrorGrid {
        maturity_years,
        base_yield,
        elapsed_years: elapsed,
        coupons: coupons.to_vec(),
        yields: yields.to_vec(),
        yield_shifts,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_axes_match_chart() {
        let coupons = GridAxis::default_coupons().values("c").unwrap();
        assert_eq!(
            coupons,
            vec![dec!(0), dec!(0.05), dec!(0.10), dec!(0.15), dec!(0.20)]
        );
        let yields = GridAxis::default_yields().values("y").unwrap();
        assert_eq!(yields.len(), 1201);
        assert_eq!(yields[0], dec!(-0.02));
        assert_eq!(yields[1200], dec!(0.10));
        assert_eq!(yields[600], dec!(0.04));
    }

    #[test]
    fn test_linspace_single_point() {
        let axis = GridAxis::Linspace {
            start: dec!(0.03),
            end: dec!(0.03),
            points: 1,
        };
        assert_eq!(axis.values("c").unwrap(), vec![dec!(0.03)]);
    }

    #[test]
    fn test_invalid_axes() {
        let zero_points = GridAxis::Linspace {
            start: dec!(0),
            end: dec!(0.2),
            points: 0,
        };
        assert!(zero_points.values("c").is_err());

        let bad_step = GridAxis::Stepped {
            start: dec!(0),
            end: dec!(0.1),
            step: dec!(0),
        };
        assert!(bad_step.values("y").is_err());

        let unsorted = GridAxis::Values {
            values: vec![dec!(0.02), dec!(0.01)],
        };
        assert!(unsorted.values("y").is_err());

        let huge = GridAxis::Stepped {
            start: dec!(0),
            end: dec!(1),
            step: dec!(0.0000001),
        };
        assert!(huge.values("y").is_err());
    }

    #[test]
    fn test_axis_span_beyond_decimal_range_is_rejected() {
        let fine_step = GridAxis::Stepped {
            start: dec!(0),
            end: dec!(100000000000000000000),
            step: dec!(0.00000000000000000001),
        };
        assert!(matches!(
            fine_step.values("y"),
            Err(BondReturnError::InvalidInput { reason, .. }) if reason.contains("exceeds")
        ));

        let full_range = GridAxis::Linspace {
            start: Decimal::MIN,
            end: Decimal::MAX,
            points: 3,
        };
        assert!(matches!(
            full_range.values("y"),
            Err(BondReturnError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_small_grid_shape_and_zero_row() {
        let coupons = [dec!(0), dec!(0.04), dec!(0.08)];
        let yields = [dec!(0.03), dec!(0.04), dec!(0.05), dec!(0.06)];
        let grid = error_grid(5, &coupons, &yields, dec!(0.04), Decimal::ONE).unwrap();
        assert_eq!(grid.shape(), (4, 3));
        for j in 0..3 {
            assert!(grid.cell(1, j).unwrap().abs() < dec!(0.0000000001));
        }
        assert_eq!(grid.yield_shifts, vec![dec!(-0.01), dec!(0), dec!(0.01), dec!(0.02)]);
        assert!(grid.cell(4, 0).is_none());
    }

    #[test]
    fn test_series_one_per_coupon() {
        let grid = error_grid(
            5,
            &[dec!(0), dec!(0.05)],
            &[dec!(0.02), dec!(0.04)],
            dec!(0.04),
            Decimal::ONE,
        )
        .unwrap();
        let series = grid.series(true);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].label, "5%");
        assert_eq!(series[1].points[0].x, dec!(-0.02));
        assert_eq!(series[1].points[0].error, grid.errors[0][1]);
    }

    #[test]
    fn test_grid_rejects_horizon_at_maturity() {
        let err = error_grid(1, &[dec!(0.04)], &[dec!(0.05)], dec!(0.04), Decimal::ONE).unwrap_err();
        assert!(matches!(err, BondReturnError::EmptyScheduleAfterHorizon { .. }));
    }

    #[test]
    fn test_max_abs_error_at_edge_of_grid() {
        let input = ErrorSweepInput {
            coupon_axis: GridAxis::Values {
                values: vec![dec!(0.04)],
            },
            yield_axis: GridAxis::Values {
                values: vec![dec!(0.0), dec!(0.04), dec!(0.06)],
            },
            ..ErrorSweepInput::default()
        };
        let out = run_error_sweep(&input).unwrap().result;
        let extreme = out.max_abs_error.unwrap();
        assert_eq!(extreme.yield_level, dec!(0.0));
    }

    #[test]
    fn test_missing_base_yield_warns() {
        let input = ErrorSweepInput {
            yield_axis: GridAxis::Values {
                values: vec![dec!(0.01), dec!(0.02)],
            },
            ..ErrorSweepInput::default()
        };
        let out = run_error_sweep(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }
}
