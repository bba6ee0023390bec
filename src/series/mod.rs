// src/series/mod.rs
//
// Reshapers from parsed/aggregated tables into the series formats the chart
// renderers consume. All pure; the drawing itself lives outside this crate.

pub mod choropleth;
pub mod flow;
pub mod pie;
pub mod point;
pub mod stacked;

pub use choropleth::to_choropleth_lookup;
pub use flow::{FlowGraph, FlowLink, FlowNode};
pub use pie::{to_pie_slices, LabeledValue, PieSlice};
pub use point::{hover_state, DisplayState, HoverLabels, PointSeries, PointerMap, SeriesPoint};
pub use stacked::{to_stacked_series, Band, StackedSeries};
