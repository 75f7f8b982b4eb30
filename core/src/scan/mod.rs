//! The result-hydration engine.
//!
//! Converts a stream of flat result rows into a caller-specified
//! destination shape — a single struct, a `Vec` of structs, a scalar, or a
//! `Vec` of scalars, with arbitrarily nested one-to-one and one-to-many
//! relations — in a single forward pass over the rows.
//!
//! The pipeline: a destination type describes itself as a [`StructShape`]
//! (via `#[derive(Hydrate)]` or generated model code); [`Scanner::new`]
//! combines that shape with the result column list into an immutable plan;
//! the materializer then consumes rows one at a time, grouping join fan-out
//! back into nested collections. Plans are pure functions of
//! (shape, column list) and may be cached and shared across scans.
//!
//! ```
//! use aquifer_core::scan::{self, Hydrate};
//! # use aquifer_core::scan::{StructShape, FieldShape, HydrateField, downcast_slot};
//! use aquifer_core::{row, MemoryRows};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Artist {
//!     id: i64,
//!     name: String,
//! }
//! # impl Hydrate for Artist {
//! #     fn struct_shape() -> StructShape {
//! #         StructShape { type_name: "Artist", table: "artist", fields: vec![
//! #             FieldShape { name: "id", column: None, unique: true, flatten: false,
//! #                 project: |p| &mut downcast_slot::<Artist>(p).id,
//! #                 kind: <i64 as HydrateField>::field_kind() },
//! #             FieldShape { name: "name", column: None, unique: false, flatten: false,
//! #                 project: |p| &mut downcast_slot::<Artist>(p).name,
//! #                 kind: <String as HydrateField>::field_kind() },
//! #         ]}
//! #     }
//! # }
//!
//! let rows = MemoryRows::new(
//!     ["artist.id", "artist.name"],
//!     vec![row![1, "Ramones"], row![2, "Motörhead"]],
//! );
//! let artists: Vec<Artist> = scan::scan_all(rows).unwrap();
//! assert_eq!(artists.len(), 2);
//! ```

mod exec;
mod plan;
mod shape;

use std::any::Any;
use std::marker::PhantomData;

use crate::column::ColumnInfo;
use crate::convert::FromValue;
use crate::error::{AquiferError, Result};
use crate::rows::RowSource;
use crate::value::Value;

pub use shape::{
    AppendFn, EnterFn, FieldKind, FieldShape, Hydrate, HydrateField, LastFn, ProjectFn, PushFn,
    StructShape, WriteFn,
};

#[doc(hidden)]
pub use shape::{
    append_opt_slot, append_slot, downcast_slot, enter_option, enter_plain, last_opt_vec, last_vec,
    push_opt_vec, push_vec, write_slot,
};

/// A reusable scan plan for one destination type and one column list.
///
/// Building the plan validates the destination shape (before any row is
/// read) and resolves every column binding and grouping key exactly once.
/// The scanner is immutable afterwards: it can be cached and used from
/// multiple threads, each scan call owning only its own cursor state.
#[derive(Debug)]
pub struct Scanner<T: Hydrate> {
    node: plan::PlanNode,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Hydrate> Scanner<T> {
    /// Builds the plan for `T` over the given result columns.
    pub fn new(columns: &[ColumnInfo]) -> Result<Self> {
        let shape = T::struct_shape();
        Ok(Self {
            node: plan::build(&shape, columns)?,
            _marker: PhantomData,
        })
    }

    /// Scans all rows into a single `T`.
    ///
    /// The first row materializes the result; further rows feed its nested
    /// collections for as long as the root group key matches. With no rows
    /// at all the destination is returned at its `Default` value.
    pub fn scan_one<R: RowSource>(&self, rows: R) -> Result<T> {
        let mut dest = T::default();
        exec::scan_struct(&self.node, &mut dest, rows)?;
        Ok(dest)
    }

    /// Scans all rows into a `Vec<T>`, collapsing join fan-out when the
    /// element shape declares a unique key.
    pub fn scan_all<R: RowSource>(&self, rows: R) -> Result<Vec<T>> {
        let mut dest = Vec::new();
        exec::scan_vec(&self.node, &mut dest, rows)?;
        Ok(dest)
    }

    /// Scans into a type-erased destination: a `&mut T` or a `&mut Vec<T>`.
    ///
    /// This is the dynamic entry point used by generated query glue; typed
    /// callers prefer [`scan_one`](Self::scan_one) /
    /// [`scan_all`](Self::scan_all). Any other destination type fails with
    /// `UnsupportedDestination`.
    pub fn scan<R: RowSource>(&self, dest: &mut dyn Any, rows: R) -> Result<()> {
        if let Some(dest) = dest.downcast_mut::<T>() {
            exec::scan_struct(&self.node, dest, rows)
        } else if let Some(dest) = dest.downcast_mut::<Vec<T>>() {
            exec::scan_vec(&self.node, dest, rows)
        } else {
            Err(AquiferError::UnsupportedDestination {
                type_name: format!(
                    "expected {ty} or Vec<{ty}>",
                    ty = std::any::type_name::<T>()
                ),
            })
        }
    }
}

/// Scans all rows of `rows` into a single struct.
pub fn scan_one<T: Hydrate, R: RowSource>(rows: R) -> Result<T> {
    Scanner::new(rows.columns())?.scan_one(rows)
}

/// Scans all rows of `rows` into a `Vec` of structs.
pub fn scan_all<T: Hydrate, R: RowSource>(rows: R) -> Result<Vec<T>> {
    Scanner::new(rows.columns())?.scan_all(rows)
}

/// Scans the first row's first column into a scalar.
///
/// With no rows the scalar is returned at its `Default` value; remaining
/// rows are not consumed.
pub fn scan_value<T, R>(mut rows: R) -> Result<T>
where
    T: FromValue + Default,
    R: RowSource,
{
    let path = first_column_name(&rows);
    match rows.next_row().map_err(AquiferError::RowSource)? {
        Some(row) => convert_cell::<T>(&row, &path),
        None => Ok(T::default()),
    }
}

/// Scans every row's first column into a `Vec` of scalars, one element per
/// row; primitives carry no relation, so no grouping applies.
pub fn scan_values<T, R>(mut rows: R) -> Result<Vec<T>>
where
    T: FromValue,
    R: RowSource,
{
    let path = first_column_name(&rows);
    let mut dest = Vec::new();
    while let Some(row) = rows.next_row().map_err(AquiferError::RowSource)? {
        let value = T::from_value(row.first().unwrap_or(&Value::Null)).map_err(|error| {
            match error {
                crate::convert::ValueError::Mismatch { found } => AquiferError::SliceMismatch {
                    found,
                    expected: std::any::type_name::<Vec<T>>(),
                },
                other => exec_field_error::<T>(other, &path),
            }
        })?;
        dest.push(value);
    }
    Ok(dest)
}

fn first_column_name<R: RowSource>(rows: &R) -> String {
    rows.columns()
        .first()
        .map(|column| column.name().to_string())
        .unwrap_or_default()
}

fn convert_cell<T: FromValue>(row: &[Value], path: &str) -> Result<T> {
    T::from_value(row.first().unwrap_or(&Value::Null))
        .map_err(|error| exec_field_error::<T>(error, path))
}

fn exec_field_error<T>(error: crate::convert::ValueError, path: &str) -> AquiferError {
    use crate::convert::ValueError;
    match error {
        ValueError::Null => AquiferError::UnexpectedNull {
            field: path.to_string(),
            expected: std::any::type_name::<T>(),
        },
        ValueError::Mismatch { found } => AquiferError::TypeMismatch {
            found,
            field: path.to_string(),
            expected: std::any::type_name::<T>(),
        },
        ValueError::Rejected { cause } => AquiferError::Rejected {
            field: path.to_string(),
            cause,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::columns;
    use crate::{row, MemoryRows};

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        id: i64,
        name: String,
    }

    impl Hydrate for Pair {
        fn struct_shape() -> StructShape {
            StructShape {
                type_name: "Pair",
                table: "pair",
                fields: vec![
                    FieldShape {
                        name: "id",
                        column: None,
                        unique: true,
                        flatten: false,
                        project: |parent| &mut downcast_slot::<Pair>(parent).id,
                        kind: <i64 as HydrateField>::field_kind(),
                    },
                    FieldShape {
                        name: "name",
                        column: None,
                        unique: false,
                        flatten: false,
                        project: |parent| &mut downcast_slot::<Pair>(parent).name,
                        kind: <String as HydrateField>::field_kind(),
                    },
                ],
            }
        }
    }

    #[test]
    fn duplicate_rows_collapse_under_a_unique_key() {
        let rows = MemoryRows::new(
            ["id", "name"],
            vec![row![1, "A"], row![1, "A"], row![2, "B"]],
        );
        let pairs: Vec<Pair> = scan_all(rows).unwrap();
        assert_eq!(
            pairs,
            vec![
                Pair { id: 1, name: "A".into() },
                Pair { id: 2, name: "B".into() },
            ]
        );
    }

    #[test]
    fn erased_destination_accepts_both_forms() {
        let scanner = Scanner::<Pair>::new(&columns(["id", "name"])).unwrap();

        let mut one = Pair::default();
        scanner
            .scan(&mut one, MemoryRows::new(["id", "name"], vec![row![7, "x"]]))
            .unwrap();
        assert_eq!(one.id, 7);

        let mut many = Vec::<Pair>::new();
        scanner
            .scan(&mut many, MemoryRows::new(["id", "name"], vec![row![7, "x"]]))
            .unwrap();
        assert_eq!(many.len(), 1);

        let mut wrong = 0i64;
        let err = scanner
            .scan(&mut wrong, MemoryRows::new(["id", "name"], vec![]))
            .unwrap_err();
        assert!(matches!(err, AquiferError::UnsupportedDestination { .. }));
    }

    #[test]
    fn scan_value_takes_the_first_row() {
        let rows = MemoryRows::new(["count"], vec![row![41], row![99]]);
        assert_eq!(scan_value::<i64, _>(rows).unwrap(), 41);

        let empty = MemoryRows::new(["count"], vec![]);
        assert_eq!(scan_value::<i64, _>(empty).unwrap(), 0);
    }

    #[test]
    fn scan_values_reports_slice_mismatch() {
        let rows = MemoryRows::new(["name"], vec![row!["A"], row!["B"]]);
        let values: Vec<String> = scan_values(rows).unwrap();
        assert_eq!(values, vec!["A".to_string(), "B".to_string()]);

        let rows = MemoryRows::new(["id"], vec![row![1]]);
        let err = scan_values::<String, _>(rows).unwrap_err();
        match err {
            AquiferError::SliceMismatch { found, expected } => {
                assert_eq!(found, "integer");
                assert!(expected.contains("Vec<"));
            }
            other => panic!("expected SliceMismatch, got {other:?}"),
        }
    }

    #[test]
    fn row_source_errors_pass_through() {
        let rows = MemoryRows::new(["id", "name"], vec![row![1, "A"]])
            .failing_with("query canceled");
        let err = scan_all::<Pair, _>(rows).unwrap_err();
        match err {
            AquiferError::RowSource(cause) => assert_eq!(cause.to_string(), "query canceled"),
            other => panic!("expected RowSource, got {other:?}"),
        }
    }
}
