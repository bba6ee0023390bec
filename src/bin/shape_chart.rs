use std::collections::HashMap;
use std::{env, process::exit};

use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use chartpipe::aggregate::percentage_of;
use chartpipe::fetch::{fetch_text, Source};
use chartpipe::format::format_number;
use chartpipe::parse::ColumnType;
use chartpipe::pipeline::{
    run_flow, run_tabular, ChartGeometry, ChartSpec, Margin, Ranking, RowFilter, Shape,
};
use chartpipe::rank::RankKey;
use chartpipe::series::pie::{emission_total, parse_labeled_values, to_pie_slices, value_total};

/// Reference figure the dashboards compare food-sector emissions against.
const FOOD_SECTOR_REFERENCE_T: f64 = 41_639_840_000.0;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <FILE-OR-URL> <line|bars|pie|map|flow> [VALUE_FIELD] [YEAR]",
            args[0]
        );
        exit(1);
    }
    let source = Source::parse(&args[1]);
    let kind = args[2].as_str();

    let client = Client::new();
    let raw = fetch_text(&client, &source).await?;
    info!(source = %source, kind, bytes = raw.len(), "dataset loaded");

    let json = match kind {
        "line" => serde_json::to_string_pretty(&run_tabular(&line_spec(), &raw)?)?,
        "bars" => serde_json::to_string_pretty(&run_tabular(&bars_spec(&raw), &raw)?)?,
        "map" => {
            let Some(value_field) = args.get(3) else {
                eprintln!("Usage: {} <FILE-OR-URL> map <VALUE_FIELD> [YEAR]", args[0]);
                exit(1);
            };
            let year = match args.get(4) {
                Some(raw_year) => raw_year
                    .parse()
                    .map_err(|_| anyhow!("invalid year `{raw_year}`"))?,
                None => 2021,
            };
            serde_json::to_string_pretty(&run_tabular(&map_spec(value_field, year), &raw)?)?
        }
        "pie" => {
            let values = parse_labeled_values(&raw)?;
            let slices = to_pie_slices(&values)?;
            let emissions = emission_total(&values);
            let share = percentage_of(emissions, FOOD_SECTOR_REFERENCE_T)?;
            serde_json::to_string_pretty(&serde_json::json!({
                "slices": slices,
                "production_total": value_total(&values),
                "emission_total": emissions,
                "food_sector_share": format!("{}%", format_number(share)),
            }))?
        }
        "flow" => {
            let graph = run_flow(&raw)?;
            let throughput: Vec<_> = graph
                .nodes
                .iter()
                .enumerate()
                .map(|(i, node)| {
                    serde_json::json!({
                        "name": node.name,
                        "throughput": graph.node_throughput(i),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&serde_json::json!({
                "graph": graph,
                "throughput": throughput,
            }))?
        }
        other => return Err(anyhow!("unknown chart kind `{other}`")),
    };

    println!("{json}");
    Ok(())
}

/// Annual-emissions line chart: the world's rows of `Entity,Year,Annual`.
fn line_spec() -> ChartSpec {
    ChartSpec {
        geometry: ChartGeometry {
            width: 900.0,
            height: 800.0,
            margin: Margin {
                top: 50.0,
                right: 10.0,
                bottom: 30.0,
                left: 80.0,
            },
        },
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
    }
}

/// Top-25 stacked bars over per-category emission columns. The category set
/// varies by dataset, so it is read off the header: everything except the
/// entity label and the precomputed `total`.
fn bars_spec(raw: &str) -> ChartSpec {
    let columns: Vec<String> = raw
        .lines()
        .next()
        .unwrap_or_default()
        .split(',')
        .map(|c| c.trim().to_string())
        .collect();

    let mut types = HashMap::new();
    let mut keys = Vec::new();
    for column in &columns {
        if column == "Entity" {
            continue;
        }
        types.insert(column.clone(), ColumnType::Number);
        if column != "total" {
            keys.push(column.clone());
        }
    }

    ChartSpec {
        geometry: ChartGeometry {
            width: 1500.0,
            height: 800.0,
            margin: Margin {
                top: 20.0,
                right: 30.0,
                bottom: 40.0,
                left: 90.0,
            },
        },
        types,
        filter: RowFilter::All,
        subgroups: keys.clone(),
        ranking: Some(Ranking {
            key: RankKey::Column("total".to_string()),
            limit: 25,
        }),
        shape: Shape::Stacked {
            entity_field: "Entity".to_string(),
            keys,
        },
    }
}

/// Production choropleth for one year, keyed by region code.
fn map_spec(value_field: &str, year: i32) -> ChartSpec {
    ChartSpec {
        geometry: ChartGeometry {
            width: 1000.0,
            height: 600.0,
            margin: Margin {
                top: 0.0,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            },
        },
        types: HashMap::from([
            ("Year".to_string(), ColumnType::Year),
            (value_field.to_string(), ColumnType::Number),
        ]),
        filter: RowFilter::All,
        subgroups: Vec::new(),
        ranking: None,
        shape: Shape::Choropleth {
            key_field: "Code".to_string(),
            value_field: value_field.to_string(),
            year_field: "Year".to_string(),
            year,
        },
    }
}
