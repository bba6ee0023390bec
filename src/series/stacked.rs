use serde::Serialize;

use crate::aggregate::AggregatedDataset;
use crate::error::ShapeError;

/// One [y0, y1] interval: a single category's contribution within a stacked
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub y0: f64,
    pub y1: f64,
}

/// One layer of a stacked chart: the per-row bands for a single category key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSeries {
    pub key: String,
    pub bands: Vec<Band>,
}

/// Shape aggregated rows into stacked band layers, one per key, in the given
/// key order.
///
/// For every row the bands partition `[0, total]` with no gaps or overlaps:
/// `bands[0].y0 == 0`, each band starts where the previous one ends, and when
/// `keys` equals the aggregation subgroups the last band ends at the row
/// total. A `NaN` cell visibly poisons that row's remaining bands, per the
/// parser's coercion rule.
pub fn to_stacked_series(
    agg: &AggregatedDataset,
    keys: &[String],
) -> Result<Vec<StackedSeries>, ShapeError> {
    for key in keys {
        agg.dataset().require_column(key)?;
    }

    let mut series: Vec<StackedSeries> = keys
        .iter()
        .map(|key| StackedSeries {
            key: key.clone(),
            bands: Vec::with_capacity(agg.len()),
        })
        .collect();

    for row in agg.dataset().rows() {
        let mut cursor = 0.0;
        for (layer, key) in series.iter_mut().zip(keys) {
            let v = row.number(key).unwrap_or(f64::NAN);
            let y0 = cursor;
            cursor += v;
            layer.bands.push(Band { y0, y1: cursor });
        }
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::parse::{ColumnType, Dataset};
    use std::collections::HashMap;

    fn keys() -> Vec<String> {
        ["Lamb", "Beef", "Pork"].map(String::from).to_vec()
    }

    fn sample() -> AggregatedDataset {
        let types = HashMap::from([
            ("Lamb".to_string(), ColumnType::Number),
            ("Beef".to_string(), ColumnType::Number),
            ("Pork".to_string(), ColumnType::Number),
        ]);
        let data = Dataset::parse_csv(
            "Entity,Lamb,Beef,Pork\n\
             World,2.0,10.0,30.0\n\
             Germany,0.5,1.5,4.0\n",
            &types,
        )
        .unwrap();
        aggregate(data, &keys()).unwrap()
    }

    #[test]
    fn bands_partition_zero_to_total() -> Result<(), ShapeError> {
        let agg = sample();
        let series = to_stacked_series(&agg, &keys())?;

        assert_eq!(series.len(), 3);
        for row in 0..agg.len() {
            assert_eq!(series[0].bands[row].y0, 0.0);
            for layer in series.windows(2) {
                assert_eq!(layer[0].bands[row].y1, layer[1].bands[row].y0);
            }
            assert_eq!(
                series.last().unwrap().bands[row].y1,
                agg.total(row).unwrap()
            );
        }
        Ok(())
    }

    #[test]
    fn layers_follow_key_order() -> Result<(), ShapeError> {
        let series = to_stacked_series(&sample(), &keys())?;
        let order: Vec<&str> = series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(order, ["Lamb", "Beef", "Pork"]);

        // first row: 2.0 / 10.0 / 30.0
        assert_eq!(series[0].bands[0], Band { y0: 0.0, y1: 2.0 });
        assert_eq!(series[1].bands[0], Band { y0: 2.0, y1: 12.0 });
        assert_eq!(series[2].bands[0], Band { y0: 12.0, y1: 42.0 });
        Ok(())
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = to_stacked_series(&sample(), &["Tofu".to_string()]).unwrap_err();
        assert!(matches!(err, ShapeError::MissingColumn(c) if c == "Tofu"));
    }

    #[test]
    fn nan_cell_poisons_following_bands() -> Result<(), ShapeError> {
        let types = HashMap::from([
            ("A".to_string(), ColumnType::Number),
            ("B".to_string(), ColumnType::Number),
        ]);
        let data = Dataset::parse_csv("Entity,A,B\nX,oops,3.0\n", &types).unwrap();
        let agg = aggregate(data, &["A".to_string(), "B".to_string()]).unwrap();

        let series = to_stacked_series(&agg, &["A".to_string(), "B".to_string()])?;
        assert!(series[0].bands[0].y1.is_nan());
        assert!(series[1].bands[0].y0.is_nan());
        assert!(agg.total(0).unwrap().is_nan());
        Ok(())
    }
}
