use std::collections::HashMap;

use chrono::Datelike;

use crate::error::ShapeError;
use crate::parse::{CellValue, Dataset};

/// Build a region-code → value lookup restricted to one year.
///
/// Codes missing from the source are absent from the map, and so are codes
/// whose value failed to parse: the map renders absence as "no data", which
/// must stay distinguishable from zero. Duplicate codes within the year keep
/// the last occurrence.
pub fn to_choropleth_lookup(
    dataset: &Dataset,
    key_field: &str,
    value_field: &str,
    year_field: &str,
    year: i32,
) -> Result<HashMap<String, f64>, ShapeError> {
    dataset.require_column(key_field)?;
    dataset.require_column(value_field)?;
    dataset.require_column(year_field)?;

    let mut lookup = HashMap::new();
    for row in dataset.rows() {
        let in_year = row
            .value(year_field)
            .map(|cell| matches_year(cell, year))
            .unwrap_or(false);
        if !in_year {
            continue;
        }
        let Some(code) = row.text(key_field) else {
            continue;
        };
        if code.is_empty() {
            continue;
        }
        let value = row.number(value_field).unwrap_or(f64::NAN);
        if value.is_nan() {
            continue;
        }
        lookup.insert(code.to_string(), value);
    }
    Ok(lookup)
}

fn matches_year(cell: &CellValue, year: i32) -> bool {
    match cell {
        CellValue::Date(d) => d.year() == year,
        CellValue::Number(v) => *v == year as f64,
        CellValue::Text(s) => s.trim() == year.to_string(),
    }
}
