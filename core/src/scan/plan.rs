//! The descriptor builder.
//!
//! Combines a destination type's [`StructShape`] with the ordered result
//! column list, once per scan plan, producing an immutable tree the row
//! materializer interprets. Binding resolution, grouping keys, and shape
//! validation all happen here — before the first row is read.

use crate::column::ColumnInfo;
use crate::error::{AquiferError, Result};

use super::shape::{AppendFn, EnterFn, FieldKind, FieldShape, LastFn, ProjectFn, PushFn, StructShape, WriteFn};

/// One struct-shaped node of a built plan.
///
/// A plan is a pure function of (type shape, column list): it may be cached
/// and shared across any number of concurrent scans.
#[derive(Debug)]
pub(crate) struct PlanNode {
    pub type_name: &'static str,
    /// Bound fields in declaration order; unbound fields are dropped here
    /// and keep their `Default` value.
    pub fields: Vec<PlanField>,
    /// Bound columns of unique-marked scalars, gathered through nested
    /// single nodes (collections are opaque to their parent's key).
    pub unique_cols: Vec<usize>,
    /// All bound scalar columns gathered the same way; the grouping
    /// fallback when no unique key is declared.
    pub own_cols: Vec<usize>,
    /// Every bound column in the whole subtree; decides whether a row has
    /// any data for this node at all.
    pub probe_cols: Vec<usize>,
}

impl PlanNode {
    /// The columns whose values decide "same logical entity as previous row".
    pub fn key_cols(&self) -> &[usize] {
        if self.unique_cols.is_empty() {
            &self.own_cols
        } else {
            &self.unique_cols
        }
    }

    /// Whether the group key comes from explicit uniqueness annotations.
    pub fn keyed_by_unique(&self) -> bool {
        !self.unique_cols.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct PlanField {
    pub project: ProjectFn,
    pub kind: PlanFieldKind,
}

#[derive(Debug)]
pub(crate) enum PlanFieldKind {
    Scalar {
        col: usize,
        write: WriteFn,
        path: String,
        ty: &'static str,
    },
    ScalarList {
        col: usize,
        append: AppendFn,
        path: String,
        ty: &'static str,
        optional: bool,
    },
    Single {
        node: PlanNode,
        enter: EnterFn,
        optional: bool,
    },
    Collection {
        node: PlanNode,
        push: PushFn,
        last: LastFn,
    },
}

/// Builds the plan for a struct-shaped destination.
pub(crate) fn build(shape: &StructShape, columns: &[ColumnInfo]) -> Result<PlanNode> {
    crate::aquifer_trace_plan!(shape.type_name, columns.len());
    build_node(shape, columns, "", shape.table)
}

fn build_node(
    shape: &StructShape,
    columns: &[ColumnInfo],
    path: &str,
    prefix: &str,
) -> Result<PlanNode> {
    let mut fields = Vec::new();
    let mut unique_cols = Vec::new();
    let mut own_cols = Vec::new();
    let mut probe_cols = Vec::new();

    for field in &shape.fields {
        let field_path = join_path(path, field.name);
        match &field.kind {
            FieldKind::Unsupported { ty } => {
                return Err(AquiferError::UnsupportedField {
                    field: field_path,
                    type_name: (*ty).to_string(),
                });
            }
            FieldKind::Scalar { write, ty } => {
                // A scalar with no matching column stays unbound; extra
                // destination fields are legal.
                if let Some(col) = resolve_binding(columns, prefix, field.name, field.column) {
                    own_cols.push(col);
                    probe_cols.push(col);
                    if field.unique {
                        unique_cols.push(col);
                    }
                    fields.push(PlanField {
                        project: field.project,
                        kind: PlanFieldKind::Scalar {
                            col,
                            write: *write,
                            path: field_path,
                            ty: *ty,
                        },
                    });
                }
            }
            FieldKind::ScalarList {
                append,
                ty,
                optional,
            } => {
                // Scalars carry no relation: lists of them bind a column but
                // never participate in grouping keys.
                if let Some(col) = resolve_binding(columns, prefix, field.name, field.column) {
                    probe_cols.push(col);
                    fields.push(PlanField {
                        project: field.project,
                        kind: PlanFieldKind::ScalarList {
                            col,
                            append: *append,
                            path: field_path,
                            ty: *ty,
                            optional: *optional,
                        },
                    });
                }
            }
            FieldKind::Single {
                shape,
                enter,
                optional,
            } => {
                let child_shape = shape();
                let child_prefix = node_prefix(field, &child_shape);
                let child = build_node(&child_shape, columns, &field_path, child_prefix)?;

                // A single child's scalars extend the parent's grouping key;
                // the child still forms its own node in the plan tree.
                unique_cols.extend_from_slice(&child.unique_cols);
                own_cols.extend_from_slice(&child.own_cols);
                probe_cols.extend_from_slice(&child.probe_cols);

                if !child.probe_cols.is_empty() {
                    fields.push(PlanField {
                        project: field.project,
                        kind: PlanFieldKind::Single {
                            node: child,
                            enter: *enter,
                            optional: *optional,
                        },
                    });
                }
            }
            FieldKind::Collection { shape, push, last, .. } => {
                let child_shape = shape();
                let child_prefix = node_prefix(field, &child_shape);
                let child = build_node(&child_shape, columns, &field_path, child_prefix)?;

                probe_cols.extend_from_slice(&child.probe_cols);

                if !child.probe_cols.is_empty() {
                    fields.push(PlanField {
                        project: field.project,
                        kind: PlanFieldKind::Collection {
                            node: child,
                            push: *push,
                            last: *last,
                        },
                    });
                }
            }
        }
    }

    Ok(PlanNode {
        type_name: shape.type_name,
        fields,
        unique_cols,
        own_cols,
        probe_cols,
    })
}

/// The table prefix a nested node qualifies its bindings with: an explicit
/// override wins, flattened fields use the child type's own prefix, and
/// named fields use the field name.
fn node_prefix<'a>(field: &'a FieldShape, child_shape: &'a StructShape) -> &'a str {
    if let Some(column) = field.column {
        column
    } else if field.flatten {
        child_shape.table
    } else {
        field.name
    }
}

/// Resolves a scalar binding: an explicit dotted override matches exactly;
/// otherwise the name is tried under the enclosing prefix first, then bare.
fn resolve_binding(
    columns: &[ColumnInfo],
    prefix: &str,
    name: &str,
    explicit: Option<&str>,
) -> Option<usize> {
    let target = explicit.unwrap_or(name);
    if target.contains('.') {
        return position(columns, target);
    }
    let qualified = format!("{prefix}.{target}");
    position(columns, &qualified).or_else(|| position(columns, target))
}

fn position(columns: &[ColumnInfo], name: &str) -> Option<usize> {
    columns.iter().position(|column| column.name() == name)
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
