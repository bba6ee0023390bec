use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// One record of the labeled-value JSON datasets
/// (`[{"label": "Beef", "value": 72_000_000, "kg": 27.0}, …]`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
    /// Per-unit emission factor; not every dataset carries one.
    #[serde(default)]
    pub kg: f64,
}

/// A slice with its computed angular span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Parse a labeled-value JSON dataset.
pub fn parse_labeled_values(text: &str) -> Result<Vec<LabeledValue>, ShapeError> {
    Ok(serde_json::from_str(text)?)
}

/// Compute angular spans proportional to value, in strict input order.
///
/// Sorting is disabled on purpose: the donut draws its groups in dataset
/// order. The spans partition `[0, 2π]`; input summing to zero cannot be
/// split and fails with [`ShapeError::DivisionByZero`].
pub fn to_pie_slices(values: &[LabeledValue]) -> Result<Vec<PieSlice>, ShapeError> {
    let total = value_total(values);
    if total == 0.0 {
        return Err(ShapeError::DivisionByZero);
    }

    let mut slices = Vec::with_capacity(values.len());
    let mut cursor = 0.0;
    for lv in values {
        let start_angle = cursor / total * TAU;
        cursor += lv.value;
        slices.push(PieSlice {
            label: lv.label.clone(),
            value: lv.value,
            start_angle,
            end_angle: cursor / total * TAU,
        });
    }
    Ok(slices)
}

/// Total production over all records (`Σ value`).
pub fn value_total(values: &[LabeledValue]) -> f64 {
    values.iter().map(|lv| lv.value).sum()
}

/// Total emissions over all records (`Σ kg · value`).
pub fn emission_total(values: &[LabeledValue]) -> f64 {
    values.iter().map(|lv| lv.kg * lv.value).sum()
}
