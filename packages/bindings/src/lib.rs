use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use bond_return_core::fixed_income::{approximation, comparison, exact, risk, sweep};
use bond_return_core::site::navigation::NavConfig;
use bond_return_core::site::routes::RoutingTable;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Single scenario
// ---------------------------------------------------------------------------

#[napi]
pub fn bond_risk(input_json: String) -> NapiResult<String> {
    let input: risk::RiskInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = risk::calculate_risk(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn exact_return(input_json: String) -> NapiResult<String> {
    let input = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = exact::calculate_exact_return(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn approximate_return(input_json: String) -> NapiResult<String> {
    let input = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = approximation::calculate_approximate_return(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_methods(input_json: String) -> NapiResult<String> {
    let input = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = comparison::compare_methods(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Error sweep
// ---------------------------------------------------------------------------

#[napi]
pub fn error_sweep(input_json: String) -> NapiResult<String> {
    let input: sweep::ErrorSweepInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = sweep::run_error_sweep(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Chart request: a sweep plus the choice of x axis.
#[derive(Deserialize)]
struct SeriesRequest {
    #[serde(flatten)]
    sweep: sweep::ErrorSweepInput,
    #[serde(default)]
    recentered: bool,
}

/// One line per coupon, ready for a multi-series line chart.
#[napi]
pub fn error_sweep_series(input_json: String) -> NapiResult<String> {
    let request: SeriesRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = sweep::run_error_sweep(&request.sweep).map_err(to_napi_error)?;
    let series = output.result.grid.series(request.recentered);
    let base_yield: Decimal = output.result.grid.base_yield;
    serde_json::to_string(&serde_json::json!({
        "base_yield": base_yield,
        "series": series,
        "warnings": output.warnings,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

#[napi]
pub fn site_routes() -> NapiResult<String> {
    let table = RoutingTable::site_default().map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "routes": table.pages(),
        "navigation": NavConfig::site_default(),
    }))
    .map_err(to_napi_error)
}

#[napi]
pub fn render_page(path: String) -> NapiResult<String> {
    let table = RoutingTable::site_default().map_err(to_napi_error)?;
    let page = table.render(&path).map_err(to_napi_error)?;
    serde_json::to_string(&page).map_err(to_napi_error)
}
