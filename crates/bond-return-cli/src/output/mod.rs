pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// An error grid flattened to a header row and one row per yield level:
/// `yield, yield_shift, <one column per coupon>`.
pub struct GridMatrix {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Pull `result.grid` out of a sweep envelope, if this is one.
pub fn grid_matrix(value: &Value) -> Option<GridMatrix> {
    let grid = value.get("result")?.get("grid")?;
    let coupons = grid.get("coupons")?.as_array()?;
    let yields = grid.get("yields")?.as_array()?;
    let shifts = grid.get("yield_shifts")?.as_array()?;
    let errors = grid.get("errors")?.as_array()?;

    let mut headers = vec!["yield".to_string(), "yield_shift".to_string()];
    headers.extend(coupons.iter().map(|c| format!("coupon_{}", format_value(c))));

    let rows = yields
        .iter()
        .zip(shifts)
        .zip(errors)
        .map(|((y, dy), row)| {
            let mut cells = vec![format_value(y), format_value(dy)];
            if let Some(row) = row.as_array() {
                cells.extend(row.iter().map(format_value));
            }
            cells
        })
        .collect();

    Some(GridMatrix { headers, rows })
}

/// Scalar rendering shared by the text formatters.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
