//! # Aquifer
//!
//! Typed hydration of flat SQL result rows into nested Rust structs.
//!
//! A query joining three tables comes back as denormalized rows: the "one"
//! side of every one-to-many join is repeated for each "many" row. Aquifer
//! turns that stream back into the shape you actually want — a struct, a
//! `Vec` of structs, or nested graphs of one-to-one and one-to-many
//! relations — in a single forward pass, grouping repeated keys back into
//! nested collections.
//!
//! ## Quick Start
//!
//! ```
//! use aquifer::prelude::*;
//!
//! #[derive(Hydrate, Default, Debug, PartialEq)]
//! struct Film {
//!     #[aquifer(unique)]
//!     film_id: i32,
//!     title: String,
//! }
//!
//! #[derive(Hydrate, Default, Debug)]
//! struct FilmInventory {
//!     #[aquifer(flatten)]
//!     film: Film,
//!     #[aquifer(column = "inventory.inventory_id")]
//!     inventory_ids: Vec<i32>,
//! }
//!
//! # fn main() -> aquifer::Result<()> {
//! // Rows as a driver would yield them for
//! // SELECT film.*, inventory.inventory_id FROM film JOIN inventory ...
//! let rows = MemoryRows::new(
//!     ["film.film_id", "film.title", "inventory.inventory_id"],
//!     vec![
//!         row![1, "Academy Dinosaur", 11],
//!         row![1, "Academy Dinosaur", 12],
//!         row![2, "Ace Goldfinger", 13],
//!     ],
//! );
//!
//! let films: Vec<FilmInventory> = scan_all(rows)?;
//! assert_eq!(films.len(), 2);
//! assert_eq!(films[0].inventory_ids, vec![11, 12]);
//! assert_eq!(films[1].film.title, "Ace Goldfinger");
//! # Ok(())
//! # }
//! ```
//!
//! ## Destinations
//!
//! | Destination           | Entry point     | Grouping                          |
//! |-----------------------|-----------------|-----------------------------------|
//! | `T: Hydrate`          | [`scan_one`]    | first row wins, nested nodes grow |
//! | `Vec<T: Hydrate>`     | [`scan_all`]    | unique key if declared            |
//! | `T: FromValue`        | [`scan_value`]  | first row                         |
//! | `Vec<T: FromValue>`   | [`scan_values`] | one element per row               |
//!
//! Reusable plans for repeated queries are built once with [`Scanner`].
//!
//! ## Feature Flags
//!
//! | Feature   | Effect                                            |
//! |-----------|---------------------------------------------------|
//! | `uuid`    | UUID columns decode into `uuid::Uuid`             |
//! | `serde`   | JSON columns decode into `serde_json::Value`      |
//! | `tracing` | plan construction and scans emit `tracing` events |

// Engine re-exports
pub use aquifer_core::column::{ColumnInfo, columns};
pub use aquifer_core::convert::{FromValue, ValueError};
pub use aquifer_core::error::{AquiferError, BoxError, Result};
pub use aquifer_core::rows::{MemoryRows, RowSource};
pub use aquifer_core::scan::{
    self, FieldKind, FieldShape, Hydrate, HydrateField, Scanner, StructShape, scan_all, scan_one,
    scan_value, scan_values,
};
pub use aquifer_core::value::Value;
pub use aquifer_core::{row, scalar_type};

// Derive macro; shares its name with the trait it implements
pub use aquifer_macros::Hydrate;

/// Everything needed to derive destinations and run scans.
pub mod prelude {
    pub use crate::{
        AquiferError, ColumnInfo, FromValue, Hydrate, MemoryRows, Result, RowSource, Scanner,
        Value, columns, row, scan_all, scan_one, scan_value, scan_values, scalar_type,
    };
}
