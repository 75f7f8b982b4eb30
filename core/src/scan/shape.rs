//! Destination shape descriptions.
//!
//! Go-style runtime reflection is replaced by a static description of each
//! destination type: `#[derive(Hydrate)]` (or a hand-written impl, or the
//! [`scalar_type!`](crate::scalar_type) macro for leaf types) emits a
//! [`StructShape`] tree plus monomorphized accessor functions. The plan
//! builder combines a shape with a column list once; the row materializer
//! then interprets the result with no further knowledge of the concrete
//! types involved.
//!
//! Accessor functions are plain `fn` pointers: each one downcasts the
//! type-erased slot it is handed back to the concrete type it was
//! monomorphized for. The plan builder guarantees slots and accessors are
//! always paired, so the downcasts cannot fail on any path through the
//! engine.

use std::any::Any;

use crate::convert::{FromValue, ValueError};
use crate::value::Value;

/// Projects a field out of its parent struct.
pub type ProjectFn = fn(&mut dyn Any) -> &mut dyn Any;

/// Converts and writes one value into a scalar slot.
pub type WriteFn = fn(&mut dyn Any, &Value) -> Result<(), ValueError>;

/// Converts and appends one value to a scalar-list slot.
pub type AppendFn = fn(&mut dyn Any, &Value) -> Result<(), ValueError>;

/// Enters a nested-object slot, allocating if absent; the flag reports
/// whether the object was created by this call.
pub type EnterFn = fn(&mut dyn Any) -> (&mut dyn Any, bool);

/// Appends a default element to a collection slot and returns it.
pub type PushFn = fn(&mut dyn Any) -> &mut dyn Any;

/// The last element of a collection slot, if any.
pub type LastFn = fn(&mut dyn Any) -> Option<&mut dyn Any>;

/// Static description of a struct-shaped destination type.
#[derive(Debug)]
pub struct StructShape {
    /// Full Rust type name, for diagnostics.
    pub type_name: &'static str,
    /// Default table prefix used to qualify this type's column bindings.
    pub table: &'static str,
    /// Field descriptions, in declaration order.
    pub fields: Vec<FieldShape>,
}

/// One field of a [`StructShape`].
#[derive(Debug)]
pub struct FieldShape {
    /// Field name as written in the struct.
    pub name: &'static str,
    /// Explicit binding override (`table.column`, or a bare column name
    /// resolved against the enclosing prefix).
    pub column: Option<&'static str>,
    /// Marked as a unique/primary key for the enclosing node's grouping.
    pub unique: bool,
    /// Binds through the child type's own table prefix instead of the
    /// field name (the anonymous-embedding analogue).
    pub flatten: bool,
    /// Projects this field out of the parent struct.
    pub project: ProjectFn,
    /// What kind of node the field becomes.
    pub kind: FieldKind,
}

/// Classification of a destination field.
#[derive(Debug)]
pub enum FieldKind {
    /// Binds to one column; written on every row.
    Scalar { write: WriteFn, ty: &'static str },
    /// A `Vec` of scalars; appends one converted value per row.
    ScalarList {
        append: AppendFn,
        ty: &'static str,
        /// Storage is `Option<Vec<_>>`; stays `None` while its column is NULL.
        optional: bool,
    },
    /// An embedded or optional nested object, at most one per parent.
    Single {
        shape: fn() -> StructShape,
        enter: EnterFn,
        optional: bool,
    },
    /// An ordered sequence of nested objects, zero or more per parent.
    Collection {
        shape: fn() -> StructShape,
        push: PushFn,
        last: LastFn,
        optional: bool,
    },
    /// A type the engine cannot classify; reported as an error when a plan
    /// is built over it, naming the field and the full type.
    Unsupported { ty: &'static str },
}

/// A struct-shaped destination type with a known shape.
///
/// Implemented by `#[derive(Hydrate)]`; the derive also emits
/// [`HydrateField`] impls for `Self`, `Option<Self>`, `Vec<Self>` and
/// `Option<Vec<Self>>` so the type can appear as a field of other
/// destinations.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a scan destination",
    label = "this type does not implement Hydrate",
    note = "add #[derive(Hydrate)] to the destination struct"
)]
pub trait Hydrate: Default + 'static {
    /// This type's shape description. Pure: depends only on the type.
    fn struct_shape() -> StructShape;
}

/// A type usable as a field of a scan destination.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a destination field",
    label = "no field classification for this type",
    note = "derive Hydrate on nested structs; register custom column types with aquifer::scalar_type!"
)]
pub trait HydrateField: 'static {
    /// The node this field type becomes in the shape tree.
    fn field_kind() -> FieldKind;
}

// =============================================================================
// Accessor building blocks (referenced by generated code)
// =============================================================================

/// Recovers the concrete type behind a plan slot.
///
/// Slots and accessors are paired at plan-build time from the same
/// [`FieldShape`], so a mismatch here is unreachable through the public API.
#[doc(hidden)]
pub fn downcast_slot<T: 'static>(slot: &mut dyn Any) -> &mut T {
    slot.downcast_mut::<T>()
        .expect("scan plan accessor applied to a slot of a different type")
}

#[doc(hidden)]
pub fn write_slot<T: FromValue>(slot: &mut dyn Any, value: &Value) -> Result<(), ValueError> {
    *downcast_slot::<T>(slot) = T::from_value(value)?;
    Ok(())
}

#[doc(hidden)]
pub fn append_slot<T: FromValue>(slot: &mut dyn Any, value: &Value) -> Result<(), ValueError> {
    downcast_slot::<Vec<T>>(slot).push(T::from_value(value)?);
    Ok(())
}

#[doc(hidden)]
pub fn append_opt_slot<T: FromValue>(slot: &mut dyn Any, value: &Value) -> Result<(), ValueError> {
    downcast_slot::<Option<Vec<T>>>(slot)
        .get_or_insert_with(Vec::new)
        .push(T::from_value(value)?);
    Ok(())
}

#[doc(hidden)]
pub fn enter_plain(slot: &mut dyn Any) -> (&mut dyn Any, bool) {
    (slot, false)
}

#[doc(hidden)]
pub fn enter_option<T: Default + 'static>(slot: &mut dyn Any) -> (&mut dyn Any, bool) {
    let option = downcast_slot::<Option<T>>(slot);
    let created = option.is_none();
    (option.get_or_insert_with(T::default) as &mut dyn Any, created)
}

#[doc(hidden)]
pub fn push_vec<T: Default + 'static>(slot: &mut dyn Any) -> &mut dyn Any {
    let vec = downcast_slot::<Vec<T>>(slot);
    vec.push(T::default());
    vec.last_mut().expect("element just appended") as &mut dyn Any
}

#[doc(hidden)]
pub fn push_opt_vec<T: Default + 'static>(slot: &mut dyn Any) -> &mut dyn Any {
    let vec = downcast_slot::<Option<Vec<T>>>(slot).get_or_insert_with(Vec::new);
    vec.push(T::default());
    vec.last_mut().expect("element just appended") as &mut dyn Any
}

#[doc(hidden)]
pub fn last_vec<T: 'static>(slot: &mut dyn Any) -> Option<&mut dyn Any> {
    downcast_slot::<Vec<T>>(slot)
        .last_mut()
        .map(|element| element as &mut dyn Any)
}

#[doc(hidden)]
pub fn last_opt_vec<T: 'static>(slot: &mut dyn Any) -> Option<&mut dyn Any> {
    downcast_slot::<Option<Vec<T>>>(slot)
        .as_mut()
        .and_then(|vec| vec.last_mut())
        .map(|element| element as &mut dyn Any)
}

// =============================================================================
// Scalar field registration
// =============================================================================

/// Implements [`HydrateField`] for a scalar column type and its `Option`/
/// `Vec` forms, making it usable as a destination field.
///
/// The type must implement [`FromValue`](crate::convert::FromValue):
///
/// ```ignore
/// struct Money(i64);
/// impl FromValue for Money { /* ... */ }
/// aquifer::scalar_type!(Money);
/// ```
#[macro_export]
macro_rules! scalar_type {
    ($($ty:ty),+ $(,)?) => { $(
        impl $crate::scan::HydrateField for $ty {
            fn field_kind() -> $crate::scan::FieldKind {
                $crate::scan::FieldKind::Scalar {
                    write: $crate::scan::write_slot::<$ty>,
                    ty: ::core::any::type_name::<$ty>(),
                }
            }
        }

        impl $crate::scan::HydrateField for ::core::option::Option<$ty> {
            fn field_kind() -> $crate::scan::FieldKind {
                $crate::scan::FieldKind::Scalar {
                    write: $crate::scan::write_slot::<::core::option::Option<$ty>>,
                    ty: ::core::any::type_name::<::core::option::Option<$ty>>(),
                }
            }
        }

        impl $crate::scan::HydrateField for ::std::vec::Vec<$ty> {
            fn field_kind() -> $crate::scan::FieldKind {
                $crate::scan::FieldKind::ScalarList {
                    append: $crate::scan::append_slot::<$ty>,
                    ty: ::core::any::type_name::<::std::vec::Vec<$ty>>(),
                    optional: false,
                }
            }
        }

        impl $crate::scan::HydrateField for ::std::vec::Vec<::core::option::Option<$ty>> {
            fn field_kind() -> $crate::scan::FieldKind {
                $crate::scan::FieldKind::ScalarList {
                    append: $crate::scan::append_slot::<::core::option::Option<$ty>>,
                    ty: ::core::any::type_name::<::std::vec::Vec<::core::option::Option<$ty>>>(),
                    optional: false,
                }
            }
        }

        impl $crate::scan::HydrateField for ::core::option::Option<::std::vec::Vec<$ty>> {
            fn field_kind() -> $crate::scan::FieldKind {
                $crate::scan::FieldKind::ScalarList {
                    append: $crate::scan::append_opt_slot::<$ty>,
                    ty: ::core::any::type_name::<::std::vec::Vec<$ty>>(),
                    optional: true,
                }
            }
        }

        impl $crate::scan::HydrateField
            for ::core::option::Option<::std::vec::Vec<::core::option::Option<$ty>>>
        {
            fn field_kind() -> $crate::scan::FieldKind {
                $crate::scan::FieldKind::ScalarList {
                    append: $crate::scan::append_opt_slot::<::core::option::Option<$ty>>,
                    ty: ::core::any::type_name::<
                        ::std::vec::Vec<::core::option::Option<$ty>>,
                    >(),
                    optional: true,
                }
            }
        }
    )+ };
}

// Built-in scalar column types. `u8` is listed without its `Vec` forms
// because `Vec<u8>` is the blob leaf, registered as a base type below.
scalar_type!(
    i8, i16, i32, i64, isize, u16, u32, u64, usize, f32, f64, bool, String, Vec<u8>
);

impl HydrateField for u8 {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar {
            write: write_slot::<u8>,
            ty: "u8",
        }
    }
}

impl HydrateField for Option<u8> {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar {
            write: write_slot::<Option<u8>>,
            ty: "core::option::Option<u8>",
        }
    }
}

scalar_type!(
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDate,
    chrono::NaiveTime,
);

#[cfg(feature = "uuid")]
scalar_type!(uuid::Uuid);

#[cfg(feature = "serde")]
scalar_type!(serde_json::Value);
