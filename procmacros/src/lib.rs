//! Procedural macros for aquifer.
//!
//! `#[derive(Hydrate)]` emits the static shape description the hydration
//! engine interprets in place of runtime reflection: a `StructShape` tree
//! plus monomorphized field accessors, and the `HydrateField` impls that
//! let the type appear as a nested field (`Self`, `Option<Self>`,
//! `Vec<Self>`, `Option<Vec<Self>>`) of other destinations.

extern crate proc_macro;

mod hydrate;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives a scan-destination shape for a struct with named fields.
///
/// The struct must also implement `Default`; unbound fields keep their
/// default value.
///
/// # Field attributes
///
/// - `#[aquifer(column = "table.column")]` — explicit binding override; a
///   bare name is resolved against the enclosing table prefix.
/// - `#[aquifer(unique)]` — marks a primary/unique key used for grouping.
/// - `#[aquifer(flatten)]` — binds the nested struct through its own table
///   prefix instead of the field name (embedding).
///
/// # Struct attributes
///
/// - `#[aquifer(table = "name")]` — table prefix for column bindings;
///   defaults to the snake_cased type name.
///
/// # Example
///
/// ```ignore
/// #[derive(Hydrate, Default)]
/// #[aquifer(table = "film")]
/// struct Film {
///     #[aquifer(unique)]
///     film_id: i32,
///     title: String,
///     release_year: Option<i32>,
/// }
/// ```
#[proc_macro_derive(Hydrate, attributes(aquifer))]
pub fn derive_hydrate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match hydrate::expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}
