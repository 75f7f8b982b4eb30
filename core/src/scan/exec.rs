//! The row materializer.
//!
//! Walks a built plan once per incoming row, depth-first and outer-to-inner,
//! writing scalars, allocating nested objects and collection elements on
//! demand, and deciding per node — by comparing group-key snapshots against
//! the previous row — whether the row continues the last materialized
//! element or starts a new one. This is what collapses one-to-many join
//! fan-out back into nested lists: an outer key that repeats across
//! consecutive rows reuses its element, while collections below it keep
//! growing as their own keys change.
//!
//! Working state is one [`Cursor`] tree per scan call, O(depth)-shaped and
//! discarded when the scan returns. Rows are assumed join-consistent (rows
//! of the same outer entity are contiguous); nothing is buffered or
//! re-sorted.

use std::any::Any;

use smallvec::SmallVec;

use crate::convert::ValueError;
use crate::error::{AquiferError, Result};
use crate::value::Value;

use super::plan::{PlanFieldKind, PlanNode};

/// Group-key snapshot: the values of a node's key columns for one row.
type Key = SmallVec<[Value; 4]>;

/// Per-scan mutable state for one plan node: the last-seen group key and
/// the cursors of nested nodes, mirroring the plan tree.
pub(crate) struct Cursor {
    last_key: Option<Key>,
    nested: Vec<Cursor>,
}

impl Cursor {
    pub(crate) fn for_node(node: &PlanNode) -> Self {
        let nested = node
            .fields
            .iter()
            .filter_map(|field| match &field.kind {
                PlanFieldKind::Single { node, .. } | PlanFieldKind::Collection { node, .. } => {
                    Some(Cursor::for_node(node))
                }
                _ => None,
            })
            .collect();
        Cursor {
            last_key: None,
            nested,
        }
    }

    /// Forget all continuation state below (and including) this node; used
    /// when an enclosing element is replaced.
    fn reset(&mut self) {
        self.last_key = None;
        self.reset_nested();
    }

    fn reset_nested(&mut self) {
        for cursor in &mut self.nested {
            cursor.reset();
        }
    }
}

fn snapshot(row: &[Value], cols: &[usize]) -> Key {
    cols.iter().map(|&col| row[col].clone()).collect()
}

fn any_non_null(row: &[Value], cols: &[usize]) -> bool {
    cols.iter().any(|&col| !row[col].is_null())
}

/// Attaches field-path context to a conversion failure.
fn field_error(error: ValueError, path: &str, expected: &'static str) -> AquiferError {
    match error {
        ValueError::Null => AquiferError::UnexpectedNull {
            field: path.to_string(),
            expected,
        },
        ValueError::Mismatch { found } => AquiferError::TypeMismatch {
            found,
            field: path.to_string(),
            expected,
        },
        ValueError::Rejected { cause } => AquiferError::Rejected {
            field: path.to_string(),
            cause,
        },
    }
}

/// Materializes one row into one element, recursing into nested nodes.
///
/// `element_is_new` is true when `element` was freshly allocated for this
/// row; nested collections reset their continuation state in that case.
pub(crate) fn fill_node(
    node: &PlanNode,
    cursor: &mut Cursor,
    element: &mut dyn Any,
    element_is_new: bool,
    row: &[Value],
) -> Result<()> {
    let mut nested = 0;
    for field in &node.fields {
        match &field.kind {
            PlanFieldKind::Scalar {
                col,
                write,
                path,
                ty,
            } => {
                let slot = (field.project)(element);
                write(slot, &row[*col]).map_err(|error| field_error(error, path, *ty))?;
            }
            PlanFieldKind::ScalarList {
                col,
                append,
                path,
                ty,
                optional,
            } => {
                let value = &row[*col];
                // Optional storage stays absent while its column is NULL.
                if !(*optional && value.is_null()) {
                    let slot = (field.project)(element);
                    append(slot, value).map_err(|error| field_error(error, path, *ty))?;
                }
            }
            PlanFieldKind::Single {
                node: child,
                enter,
                optional,
            } => {
                let cursor = &mut cursor.nested[nested];
                nested += 1;
                // An optional nested object materializes only when the row
                // carries data for it; all-NULL rows leave it absent.
                if *optional && !any_non_null(row, &child.probe_cols) {
                    continue;
                }
                let slot = (field.project)(element);
                let (child_element, created) = enter(slot);
                fill_node(child, cursor, child_element, element_is_new || created, row)?;
            }
            PlanFieldKind::Collection {
                node: child,
                push,
                last,
            } => {
                let cursor = &mut cursor.nested[nested];
                nested += 1;
                if element_is_new {
                    cursor.reset();
                }
                // Rows with no data for this node never start an element.
                if !any_non_null(row, &child.probe_cols) {
                    continue;
                }
                let key = snapshot(row, child.key_cols());
                let slot = (field.project)(element);
                let continues = cursor.last_key.as_ref() == Some(&key);
                let (child_element, created) = if continues {
                    (
                        last(slot).expect("continuing a collection that has an element"),
                        false,
                    )
                } else {
                    cursor.reset_nested();
                    cursor.last_key = Some(key);
                    (push(slot), true)
                };
                fill_node(child, cursor, child_element, created, row)?;
            }
        }
    }
    Ok(())
}

/// Scans all rows into a single struct destination.
///
/// The first row materializes the destination and fixes its group key;
/// further rows with the same key keep feeding nested nodes, and rows
/// belonging to a different outer entity are ignored.
pub(crate) fn scan_struct<R>(node: &PlanNode, element: &mut dyn Any, mut rows: R) -> Result<()>
where
    R: crate::rows::RowSource,
{
    let mut cursor = Cursor::for_node(node);
    let mut root_key: Option<Key> = None;
    let mut row_count = 0usize;
    while let Some(row) = rows.next_row().map_err(AquiferError::RowSource)? {
        row_count += 1;
        let key = snapshot(&row, node.key_cols());
        match &root_key {
            None => {
                fill_node(node, &mut cursor, element, true, &row)?;
                root_key = Some(key);
            }
            Some(current) if *current == key => {
                fill_node(node, &mut cursor, element, false, &row)?;
            }
            Some(_) => {}
        }
    }
    crate::aquifer_trace_scan!(node.type_name, row_count);
    Ok(())
}

/// Scans all rows into a `Vec` destination.
///
/// With a unique-key annotation on the element shape, consecutive rows
/// repeating the key collapse into one element; without one, every row
/// appends — a direct slice scan does not guess at grouping.
pub(crate) fn scan_vec<T, R>(node: &PlanNode, dest: &mut Vec<T>, mut rows: R) -> Result<()>
where
    T: Default + 'static,
    R: crate::rows::RowSource,
{
    let mut cursor = Cursor::for_node(node);
    let grouped = node.keyed_by_unique();
    let mut row_count = 0usize;
    while let Some(row) = rows.next_row().map_err(AquiferError::RowSource)? {
        row_count += 1;
        let key = snapshot(&row, node.key_cols());
        let continues = grouped && !dest.is_empty() && cursor.last_key.as_ref() == Some(&key);
        if !continues {
            cursor.reset_nested();
            cursor.last_key = Some(key);
            dest.push(T::default());
        }
        let index = dest.len() - 1;
        fill_node(node, &mut cursor, &mut dest[index], !continues, &row)?;
    }
    crate::aquifer_trace_scan!(node.type_name, row_count);
    Ok(())
}
