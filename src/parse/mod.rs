// src/parse/mod.rs

use std::collections::HashMap;
use std::io::Cursor;

use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::ShapeError;

pub mod date;

/// How a raw column is coerced while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Keep the raw text (entity names, region codes).
    Text,
    /// Parse as `f64`; unparseable input becomes `NaN` and stays visible.
    Number,
    /// Parse as a year or full date; unparseable input is an error, because
    /// axis keys must be orderable.
    Year,
}

/// One typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Numeric axis coordinate: numbers as-is, dates as decimal years
    /// (`2021-07-02` → `2021.49…`), text has no coordinate.
    pub fn axis_coord(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Date(d) => Some(d.year() as f64 + d.ordinal0() as f64 / 366.0),
            CellValue::Text(_) => None,
        }
    }
}

/// One parsed record. Cells are positional, aligned with `Dataset::columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<CellValue>,
}

impl Row {
    pub fn cell(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A borrowed view of one row with by-name access.
#[derive(Clone, Copy)]
pub struct RowRef<'a> {
    data: &'a Dataset,
    index: usize,
}

impl<'a> RowRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self, column: &str) -> Option<&'a CellValue> {
        let col = self.data.column_index(column)?;
        self.data.rows[self.index].cell(col)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.value(column).and_then(CellValue::as_number)
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.value(column).and_then(CellValue::as_text)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.value(column).and_then(CellValue::as_date)
    }
}

/// An immutable parsed table: an ordered sequence of rows sharing one column
/// set. Re-built per page load, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Parse delimited text with a header line into a typed dataset.
    ///
    /// Columns absent from `types` default to [`ColumnType::Text`]. Numeric
    /// cells that fail to parse become `NaN` so downstream sums go visibly
    /// `NaN` instead of silently wrong; year cells that fail to parse are a
    /// [`ShapeError::Parse`].
    pub fn parse_csv(
        text: &str,
        types: &HashMap<String, ColumnType>,
    ) -> Result<Dataset, ShapeError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(Cursor::new(text.as_bytes()));

        let columns: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let mut cells = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                let raw = record.get(i).unwrap_or("");
                let cell = match types.get(column).copied().unwrap_or(ColumnType::Text) {
                    ColumnType::Text => CellValue::Text(raw.to_string()),
                    ColumnType::Number => match raw.parse::<f64>() {
                        Ok(v) => CellValue::Number(v),
                        Err(_) => {
                            debug!(column = %column, raw = %raw, "non-numeric cell, keeping NaN");
                            CellValue::Number(f64::NAN)
                        }
                    },
                    ColumnType::Year => {
                        let d = date::parse_year_or_date(raw).ok_or_else(|| {
                            ShapeError::Parse {
                                field: column.clone(),
                                raw: raw.to_string(),
                            }
                        })?;
                        CellValue::Date(d)
                    }
                };
                cells.push(cell);
            }
            rows.push(Row { cells });
        }

        Ok(Dataset { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Error-raising variant of [`column_index`](Self::column_index) for
    /// stages that require the column.
    pub fn require_column(&self, name: &str) -> Result<usize, ShapeError> {
        self.column_index(name)
            .ok_or_else(|| ShapeError::MissingColumn(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        (index < self.rows.len()).then_some(RowRef { data: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.rows.len()).map(move |index| RowRef { data: self, index })
    }

    pub fn number(&self, index: usize, column: &str) -> Option<f64> {
        self.row(index)?.number(column)
    }

    pub fn text(&self, index: usize, column: &str) -> Option<&str> {
        self.row(index)?.text(column)
    }

    /// Pure row filter. An empty result is a valid dataset, not an error.
    pub fn filter<P>(&self, mut pred: P) -> Dataset
    where
        P: FnMut(RowRef<'_>) -> bool,
    {
        let keep: Vec<usize> = (0..self.rows.len())
            .filter(|&index| pred(RowRef { data: self, index }))
            .collect();
        self.select(&keep)
    }

    /// New dataset holding the given rows, in the given order.
    pub(crate) fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}
