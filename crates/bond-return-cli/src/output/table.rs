use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_value, grid_matrix};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(matrix) = grid_matrix(value) {
        let mut builder = Builder::default();
        builder.push_record(matrix.headers);
        for row in matrix.rows {
            builder.push_record(row);
        }
        println!("{}", Table::from(builder));
        print_envelope_notes(value);
        return;
    }

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_field_table(result);
                print_envelope_notes(value);
            }
            _ => print_field_table(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_field_table(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

/// Warnings and methodology from the computation envelope.
fn print_envelope_notes(value: &Value) {
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}
