//! The row-source boundary.
//!
//! A [`RowSource`] is whatever executed the query: it reports the ordered
//! output column list once, then yields rows as ordered values aligned to
//! that list, ending with `Ok(None)` or an error. The engine pulls rows one
//! at a time and never buffers the result set.
//!
//! [`MemoryRows`] is the in-process implementation used by tests and by
//! adapters that already hold a materialized result.

use std::collections::VecDeque;

use crate::column::ColumnInfo;
use crate::error::BoxError;
use crate::value::Value;

/// A pull-based source of result rows for one executed query.
///
/// Row-source failures (connectivity, query cancellation) are returned as-is
/// and passed through to the caller without reinterpretation.
pub trait RowSource {
    /// The ordered output columns; fixed for the lifetime of the source.
    fn columns(&self) -> &[ColumnInfo];

    /// The next row, aligned to [`columns`](Self::columns); `Ok(None)` at
    /// end of data.
    fn next_row(&mut self) -> Result<Option<Vec<Value>>, BoxError>;
}

impl<R: RowSource + ?Sized> RowSource for &mut R {
    fn columns(&self) -> &[ColumnInfo] {
        (**self).columns()
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, BoxError> {
        (**self).next_row()
    }
}

/// An in-memory row source over pre-built rows.
#[derive(Debug, Default)]
pub struct MemoryRows {
    columns: Vec<ColumnInfo>,
    rows: VecDeque<Vec<Value>>,
    error: Option<BoxError>,
}

impl MemoryRows {
    /// Creates a source over the given columns and rows.
    pub fn new<C, R>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<ColumnInfo>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows.into_iter().collect(),
            error: None,
        }
    }

    /// Makes the source fail with `error` after its rows are exhausted.
    ///
    /// Used to exercise error pass-through without a live connection.
    pub fn failing_with(mut self, error: impl Into<BoxError>) -> Self {
        self.error = Some(error.into());
        self
    }
}

impl RowSource for MemoryRows {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, BoxError> {
        if let Some(row) = self.rows.pop_front() {
            return Ok(Some(row));
        }
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(None),
        }
    }
}

/// Builds one row of [`Value`]s from anything convertible into them.
///
/// ```
/// use aquifer_core::{row, Value};
///
/// let r = row![1_i64, "Academy Dinosaur", Value::Null];
/// assert_eq!(r[1], Value::Text("Academy Dinosaur".into()));
/// ```
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),*]
    };
}
