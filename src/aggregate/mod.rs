// src/aggregate/mod.rs

use crate::error::ShapeError;
use crate::parse::Dataset;

/// A dataset annotated with one derived `total` per row.
///
/// The total is the sum over a fixed subgroup key list, computed with the same
/// keys in the same order for every row, so stacked bands and ranked totals
/// stay internally consistent. A subgroup cell that is `NaN` (or not numeric
/// at all) makes the row total `NaN`, so bad input stays visible.
#[derive(Debug, Clone)]
pub struct AggregatedDataset {
    dataset: Dataset,
    subgroups: Vec<String>,
    totals: Vec<f64>,
}

impl AggregatedDataset {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn subgroups(&self) -> &[String] {
        &self.subgroups
    }

    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    pub fn total(&self, row: usize) -> Option<f64> {
        self.totals.get(row).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// New aggregate holding the given rows, in the given order.
    pub(crate) fn select(&self, indices: &[usize]) -> AggregatedDataset {
        AggregatedDataset {
            dataset: self.dataset.select(indices),
            subgroups: self.subgroups.clone(),
            totals: indices.iter().map(|&i| self.totals[i]).collect(),
        }
    }
}

/// Derive per-row totals over `subgroups`.
///
/// Every subgroup must exist as a column; an empty subgroup list yields a
/// total of `0.0` per row (useful when ranking on a plain column instead).
pub fn aggregate(dataset: Dataset, subgroups: &[String]) -> Result<AggregatedDataset, ShapeError> {
    for key in subgroups {
        dataset.require_column(key)?;
    }

    let totals = dataset
        .rows()
        .map(|row| {
            subgroups
                .iter()
                .map(|key| row.number(key).unwrap_or(f64::NAN))
                .sum()
        })
        .collect();

    Ok(AggregatedDataset {
        dataset,
        subgroups: subgroups.to_vec(),
        totals,
    })
}

/// Sum one numeric column over the whole dataset (world totals and the like).
pub fn column_sum(dataset: &Dataset, column: &str) -> Result<f64, ShapeError> {
    dataset.require_column(column)?;
    Ok(dataset
        .rows()
        .map(|row| row.number(column).unwrap_or(f64::NAN))
        .sum())
}

/// Share of `part` against an externally supplied reference total, in percent.
pub fn percentage_of(part: f64, whole: f64) -> Result<f64, ShapeError> {
    if whole == 0.0 {
        return Err(ShapeError::DivisionByZero);
    }
    Ok(part / whole * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ColumnType;
    use std::collections::HashMap;

    fn meat_dataset() -> Dataset {
        let types = HashMap::from([
            ("Lamb".to_string(), ColumnType::Number),
            ("Beef".to_string(), ColumnType::Number),
            ("Pork".to_string(), ColumnType::Number),
        ]);
        Dataset::parse_csv(
            "Entity,Lamb,Beef,Pork\n\
             World,2.0,10.0,30.0\n\
             Germany,0.5,1.5,4.0\n",
            &types,
        )
        .unwrap()
    }

    #[test]
    fn row_total_is_sum_of_subgroups() -> Result<(), ShapeError> {
        let keys: Vec<String> = ["Lamb", "Beef", "Pork"].map(String::from).to_vec();
        let agg = aggregate(meat_dataset(), &keys)?;

        assert_eq!(agg.total(0), Some(42.0));
        assert_eq!(agg.total(1), Some(6.0));
        // property: total == Σ subgroups, for every row
        for row in 0..agg.len() {
            let manual: f64 = keys
                .iter()
                .map(|k| agg.dataset().number(row, k).unwrap())
                .sum();
            assert_eq!(agg.total(row), Some(manual));
        }
        Ok(())
    }

    #[test]
    fn nan_subgroup_makes_total_nan() -> Result<(), ShapeError> {
        let types = HashMap::from([
            ("A".to_string(), ColumnType::Number),
            ("B".to_string(), ColumnType::Number),
        ]);
        let data = Dataset::parse_csv("Entity,A,B\nX,oops,2.0\n", &types)?;
        let agg = aggregate(data, &["A".to_string(), "B".to_string()])?;
        assert!(agg.total(0).unwrap().is_nan());
        Ok(())
    }

    #[test]
    fn unknown_subgroup_is_rejected() {
        let err = aggregate(meat_dataset(), &["Tofu".to_string()]).unwrap_err();
        assert!(matches!(err, ShapeError::MissingColumn(c) if c == "Tofu"));
    }

    #[test]
    fn column_sum_over_dataset() -> Result<(), ShapeError> {
        assert_eq!(column_sum(&meat_dataset(), "Beef")?, 11.5);
        Ok(())
    }

    #[test]
    fn percentage_against_reference() -> Result<(), ShapeError> {
        assert_eq!(percentage_of(25.0, 200.0)?, 12.5);
        Ok(())
    }

    #[test]
    fn percentage_against_zero_fails() {
        assert!(matches!(
            percentage_of(100.0, 0.0),
            Err(ShapeError::DivisionByZero)
        ));
    }
}
