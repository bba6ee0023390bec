use serde::Serialize;

use crate::error::ShapeError;
use crate::format::format_number;
use crate::parse::{CellValue, Dataset};

/// A single (x, y) sample. `x` is a numeric axis coordinate (a year, or a
/// decimal year for full dates), `y` the measured value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

/// A point series kept sorted ascending by `x`, so hover lookups can bisect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    points: Vec<SeriesPoint>,
}

impl PointSeries {
    /// Shape a dataset into an x-ascending point series.
    ///
    /// `x_field` must hold orderable cells (numbers or dates); a text cell or
    /// a `NaN` there is a [`ShapeError::Parse`], because a bisection over the
    /// series needs a total order. `y` values follow the usual rule: anything
    /// non-numeric rides along as `NaN`.
    pub fn from_dataset(
        dataset: &Dataset,
        x_field: &str,
        y_field: &str,
    ) -> Result<PointSeries, ShapeError> {
        dataset.require_column(x_field)?;
        dataset.require_column(y_field)?;

        let mut points = Vec::with_capacity(dataset.len());
        for row in dataset.rows() {
            let cell = row.value(x_field).expect("column checked above");
            let x = cell.axis_coord().filter(|v| !v.is_nan()).ok_or_else(|| {
                ShapeError::Parse {
                    field: x_field.to_string(),
                    raw: match cell {
                        CellValue::Text(s) => s.clone(),
                        _ => "NaN".to_string(),
                    },
                }
            })?;
            let y = row.number(y_field).unwrap_or(f64::NAN);
            points.push(SeriesPoint { x, y });
        }

        // stable, so equal-x points keep their input order
        points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        Ok(PointSeries { points })
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// x-extent of the series, `None` when empty.
    pub fn domain(&self) -> Option<(f64, f64)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.x, last.x)),
            _ => None,
        }
    }

    /// Nearest point to `x0` by binary search over the ascending `x` axis.
    ///
    /// Exact ties between the two neighbours resolve to the earlier point.
    pub fn nearest(&self, x0: f64) -> Option<&SeriesPoint> {
        if self.points.is_empty() {
            return None;
        }
        let idx = self.points.partition_point(|p| p.x < x0);
        let after = self.points.get(idx);
        let before = idx.checked_sub(1).and_then(|i| self.points.get(i));
        match (before, after) {
            (Some(b), Some(a)) => {
                if (x0 - b.x) > (a.x - x0) {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (Some(b), None) => Some(b),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }
}

/// Maps a pointer offset inside the plot area back onto the x domain.
///
/// This replaces the scale-`invert` the renderer used to own: the hover logic
/// needs only this one linear inversion, everything pixel-ward stays outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMap {
    plot_width: f64,
    domain: (f64, f64),
}

impl PointerMap {
    pub fn new(plot_width: f64, domain: (f64, f64)) -> PointerMap {
        PointerMap { plot_width, domain }
    }

    pub fn invert(&self, pointer_x: f64) -> f64 {
        if self.plot_width > 0.0 {
            self.domain.0 + (pointer_x / self.plot_width) * (self.domain.1 - self.domain.0)
        } else {
            self.domain.0
        }
    }
}

/// Caption wording for [`hover_state`]; the dashboards use both English and
/// German variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverLabels<'a> {
    pub axis: &'a str,
    pub value: &'a str,
    pub unit: &'a str,
}

impl Default for HoverLabels<'_> {
    fn default() -> Self {
        HoverLabels {
            axis: "Year",
            value: "Value",
            unit: "t",
        }
    }
}

/// What the presentation layer shows for one hover position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub x: f64,
    pub y: f64,
    pub caption: String,
}

/// Pure hover lookup: pointer offset → nearest point → display state.
///
/// Idempotent and side-effect-free; the adapter owns the DOM update. Returns
/// `None` on an empty series (that chart section simply shows nothing).
pub fn hover_state(
    series: &PointSeries,
    map: PointerMap,
    pointer_x: f64,
    labels: &HoverLabels<'_>,
) -> Option<DisplayState> {
    let x0 = map.invert(pointer_x);
    let p = series.nearest(x0)?;
    let caption = format!(
        "{}: {} | {}: {}{}",
        labels.axis,
        p.x.floor() as i64,
        labels.value,
        format_number(p.y),
        labels.unit,
    );
    Some(DisplayState {
        x: p.x,
        y: p.y,
        caption,
    })
}
