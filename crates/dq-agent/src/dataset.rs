//! In-memory tabular dataset consumed by the profiler.
//!
//! The profiler never reads files. Callers hand it a [`Dataset`] built
//! directly from cells or converted from a polars [`DataFrame`].

use crate::error::Result;
use crate::utils::{is_float_dtype, is_integer_dtype, is_missing_text};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Whether the cell counts as missing (null, NaN, blank or a null marker).
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Float(v) => v.is_nan(),
            Cell::Text(s) => is_missing_text(s),
            Cell::Bool(_) | Cell::Int(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s.trim()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Missing, Into::into)
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Build a column from anything convertible into cells.
    pub fn from_values<T: Into<Cell>>(name: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(name, values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// An ordered sequence of named columns.
///
/// Columns are not required to have equal length at construction time;
/// the profiler rejects ragged datasets with
/// [`ProfilingError::InconsistentColumnLengths`](crate::error::ProfilingError).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows, taken from the first column (0 without columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Convert a polars DataFrame into a dataset.
    ///
    /// Integer columns become [`Cell::Int`], float columns [`Cell::Float`],
    /// booleans [`Cell::Bool`] and every other dtype is cast to string.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| series_to_column(col.as_materialized_series()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }
}

fn series_to_column(series: &Series) -> Result<Column> {
    let name = series.name().to_string();
    let dtype = series.dtype();

    let cells: Vec<Cell> = if is_integer_dtype(dtype) {
        let casted = series.cast(&DataType::Int64)?;
        casted.i64()?.into_iter().map(Cell::from).collect()
    } else if is_float_dtype(dtype) {
        let casted = series.cast(&DataType::Float64)?;
        casted.f64()?.into_iter().map(Cell::from).collect()
    } else if dtype == &DataType::Boolean {
        series.bool()?.into_iter().map(Cell::from).collect()
    } else {
        let casted = series.cast(&DataType::String)?;
        casted.str()?.into_iter().map(Cell::from).collect()
    };

    Ok(Column::new(name, cells))
}
