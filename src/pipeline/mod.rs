// src/pipeline/mod.rs
//
// One parameterized pipeline shared by every chart. Each page load runs
// raw text → parse → filter → aggregate → rank → reshape from scratch; no
// state survives between invocations.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::aggregate::aggregate;
use crate::error::ShapeError;
use crate::parse::{ColumnType, Dataset};
use crate::rank::{rank_top_n, RankKey};
use crate::series::{
    pie::parse_labeled_values, to_choropleth_lookup, to_pie_slices, to_stacked_series, FlowGraph,
    PieSlice, PointSeries, PointerMap, StackedSeries,
};

/// Margins around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Per-chart drawing geometry.
///
/// This used to live in shared module globals reused across handlers; it is
/// now plain data passed into each pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl ChartGeometry {
    pub fn plot_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }

    /// Pointer inversion over this chart's plot area for the given x domain.
    pub fn pointer_map(&self, domain: (f64, f64)) -> PointerMap {
        PointerMap::new(self.plot_width(), domain)
    }
}

/// Row filter applied right after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    All,
    /// Keep rows whose text cell equals `value` (e.g. `Entity == "World"`).
    TextEquals { column: String, value: String },
}

/// Ranking step: stable descending sort on `key`, cut to `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub key: RankKey,
    pub limit: usize,
}

/// Which series family the chart needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Points {
        x_field: String,
        y_field: String,
    },
    Stacked {
        entity_field: String,
        keys: Vec<String>,
    },
    Choropleth {
        key_field: String,
        value_field: String,
        year_field: String,
        year: i32,
    },
}

/// Everything one tabular chart needs to turn a raw file into its series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub geometry: ChartGeometry,
    pub types: HashMap<String, ColumnType>,
    pub filter: RowFilter,
    pub subgroups: Vec<String>,
    pub ranking: Option<Ranking>,
    pub shape: Shape,
}

/// The reshaped series handed to the presentation layer.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesOutput {
    Points(PointSeries),
    Stacked {
        entities: Vec<String>,
        layers: Vec<StackedSeries>,
    },
    Choropleth(HashMap<String, f64>),
}

/// Run the whole tabular pipeline for one chart.
pub fn run_tabular(spec: &ChartSpec, raw: &str) -> Result<SeriesOutput, ShapeError> {
    let data = Dataset::parse_csv(raw, &spec.types)?;
    let data = match &spec.filter {
        RowFilter::All => data,
        RowFilter::TextEquals { column, value } => {
            data.filter(|row| row.text(column) == Some(value.as_str()))
        }
    };

    let mut agg = aggregate(data, &spec.subgroups)?;
    if let Some(ranking) = &spec.ranking {
        agg = rank_top_n(&agg, &ranking.key, ranking.limit)?;
    }
    info!(rows = agg.len(), "pipeline shaped");

    match &spec.shape {
        Shape::Points { x_field, y_field } => Ok(SeriesOutput::Points(PointSeries::from_dataset(
            agg.dataset(),
            x_field,
            y_field,
        )?)),
        Shape::Stacked { entity_field, keys } => {
            agg.dataset().require_column(entity_field)?;
            let entities = agg
                .dataset()
                .rows()
                .map(|row| row.text(entity_field).unwrap_or_default().to_string())
                .collect();
            Ok(SeriesOutput::Stacked {
                entities,
                layers: to_stacked_series(&agg, keys)?,
            })
        }
        Shape::Choropleth {
            key_field,
            value_field,
            year_field,
            year,
        } => Ok(SeriesOutput::Choropleth(to_choropleth_lookup(
            agg.dataset(),
            key_field,
            value_field,
            year_field,
            *year,
        )?)),
    }
}

/// Pipeline entry for the labeled-value JSON charts (pie/donut).
pub fn run_pie(raw: &str) -> Result<Vec<PieSlice>, ShapeError> {
    let values = parse_labeled_values(raw)?;
    to_pie_slices(&values)
}

/// Pipeline entry for the flow-graph JSON charts (Sankey input).
pub fn run_flow(raw: &str) -> Result<FlowGraph, ShapeError> {
    let graph = FlowGraph::parse(raw)?;
    graph.validate()?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> ChartGeometry {
        ChartGeometry {
            width: 900.0,
            height: 800.0,
            margin: Margin {
                top: 50.0,
                right: 10.0,
                bottom: 30.0,
                left: 80.0,
            },
        }
    }

    #[test]
    fn plot_area_subtracts_margins() {
        let g = geometry();
        assert_eq!(g.plot_width(), 810.0);
        assert_eq!(g.plot_height(), 720.0);
        let map = g.pointer_map((1960.0, 2020.0));
        assert_eq!(map.invert(0.0), 1960.0);
        assert_eq!(map.invert(810.0), 2020.0);
    }

    #[test]
    fn line_chart_end_to_end() -> Result<(), ShapeError> {
        let spec = ChartSpec {
            geometry: geometry(),
            types: HashMap::from([
                ("Year".to_string(), ColumnType::Year),
                ("Annual".to_string(), ColumnType::Number),
            ]),
            filter: RowFilter::TextEquals {
                column: "Entity".to_string(),
                value: "World".to_string(),
            },
            subgroups: Vec::new(),
            ranking: None,
            shape: Shape::Points {
                x_field: "Year".to_string(),
                y_field: "Annual".to_string(),
            },
        };
        let raw = "Entity,Year,Annual\n\
                   Germany,1987,900.0\n\
                   World,1988,21000.0\n\
                   World,1987,19000.0\n";

        let SeriesOutput::Points(series) = run_tabular(&spec, raw)? else {
            panic!("expected point series");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].x, 1987.0);
        assert_eq!(series.points()[0].y, 19000.0);
        Ok(())
    }

    #[test]
    fn ranked_stacked_bars_end_to_end() -> Result<(), ShapeError> {
        let keys: Vec<String> = ["Farm", "Transport"].map(String::from).to_vec();
        let spec = ChartSpec {
            geometry: geometry(),
            types: HashMap::from([
                ("Farm".to_string(), ColumnType::Number),
                ("Transport".to_string(), ColumnType::Number),
                ("total".to_string(), ColumnType::Number),
            ]),
            filter: RowFilter::All,
            subgroups: keys.clone(),
            ranking: Some(Ranking {
                key: RankKey::Column("total".to_string()),
                limit: 2,
            }),
            shape: Shape::Stacked {
                entity_field: "Entity".to_string(),
                keys: keys.clone(),
            },
        };
        let raw = "Entity,Farm,Transport,total\n\
                   Apples,0.2,0.1,0.4\n\
                   Beef,39.4,0.3,59.6\n\
                   Cheese,13.1,0.1,21.2\n";

        let SeriesOutput::Stacked { entities, layers } = run_tabular(&spec, raw)? else {
            panic!("expected stacked series");
        };
        assert_eq!(entities, ["Beef", "Cheese"]);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].bands[0].y0, 0.0);
        assert_eq!(layers[0].bands[0].y1, 39.4);
        assert_eq!(layers[1].bands[0].y0, 39.4);
        Ok(())
    }

    #[test]
    fn choropleth_end_to_end() -> Result<(), ShapeError> {
        let spec = ChartSpec {
            geometry: geometry(),
            types: HashMap::from([
                ("Year".to_string(), ColumnType::Year),
                ("Beef".to_string(), ColumnType::Number),
            ]),
            filter: RowFilter::All,
            subgroups: Vec::new(),
            ranking: None,
            shape: Shape::Choropleth {
                key_field: "Code".to_string(),
                value_field: "Beef".to_string(),
                year_field: "Year".to_string(),
                year: 2021,
            },
        };
        let raw = "Entity,Code,Year,Beef\n\
                   Germany,DEU,2021,1000.0\n\
                   Germany,DEU,2020,900.0\n";

        let SeriesOutput::Choropleth(lookup) = run_tabular(&spec, raw)? else {
            panic!("expected choropleth lookup");
        };
        assert_eq!(lookup.get("DEU"), Some(&1000.0));
        assert_eq!(lookup.len(), 1);
        Ok(())
    }

    #[test]
    fn json_pipelines() -> Result<(), ShapeError> {
        let slices = run_pie(r#"[{"label": "Beef", "value": 3.0, "kg": 27.0}]"#)?;
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].end_angle, std::f64::consts::TAU);

        let graph = run_flow(
            r#"{"nodes": [{"name": "A"}, {"name": "B"}],
                "links": [{"source": 0, "target": 1, "value": 5.0}]}"#,
        )?;
        assert_eq!(graph.nodes.len(), 2);

        let err = run_flow(
            r#"{"nodes": [{"name": "A"}],
                "links": [{"source": 0, "target": 99, "value": 5.0}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ShapeError::InvalidGraphReference { .. }));
        Ok(())
    }
}
