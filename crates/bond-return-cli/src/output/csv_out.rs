use serde_json::Value;
use std::io;

use super::{format_value, grid_matrix};

/// Write output as CSV to stdout. Sweep grids become one row per yield.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(matrix) = grid_matrix(value) {
        let _ = wtr.write_record(&matrix.headers);
        for row in &matrix.rows {
            let _ = wtr.write_record(row);
        }
        let _ = wtr.flush();
        return;
    }

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                // Two-column CSV: field, value
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in result {
                    let _ = wtr.write_record([key.as_str(), &format_value(val)]);
                }
            } else if let Some(Value::Array(routes)) = map.get("routes") {
                write_array_csv(&mut wtr, routes);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
