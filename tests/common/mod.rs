//! Shared destination models and fixtures, shaped like the generated model
//! types a schema code generator would emit for a small rental schema.

#![allow(dead_code)]

use aquifer::prelude::*;

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "film")]
pub struct Film {
    #[aquifer(unique)]
    pub film_id: i32,
    pub title: String,
    pub release_year: Option<i32>,
    pub rental_rate: f64,
}

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "inventory")]
pub struct Inventory {
    #[aquifer(unique)]
    pub inventory_id: i32,
    pub film_id: i32,
    pub store_id: Option<i16>,
}

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "store")]
pub struct Store {
    #[aquifer(unique)]
    pub store_id: i16,
    pub manager_staff_id: i16,
}

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "language")]
pub struct Language {
    #[aquifer(unique)]
    pub language_id: i16,
    pub name: String,
}

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "actor")]
pub struct Actor {
    #[aquifer(unique)]
    pub actor_id: i32,
    pub first_name: String,
}

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "country")]
pub struct Country {
    #[aquifer(unique)]
    pub country_id: i32,
    pub country: String,
}

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "city")]
pub struct City {
    #[aquifer(unique)]
    pub city_id: i32,
    pub city: String,
    pub country_id: i32,
}

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "address")]
pub struct Address {
    #[aquifer(unique)]
    pub address_id: i32,
    pub address: String,
    pub city_id: i32,
}

#[derive(Hydrate, Default, Debug, Clone, PartialEq)]
#[aquifer(table = "customer")]
pub struct Customer {
    #[aquifer(unique)]
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
}

pub fn film1() -> Film {
    Film {
        film_id: 1,
        title: "Academy Dinosaur".into(),
        release_year: Some(2006),
        rental_rate: 0.99,
    }
}

pub fn film2() -> Film {
    Film {
        film_id: 2,
        title: "Ace Goldfinger".into(),
        release_year: Some(2006),
        rental_rate: 4.99,
    }
}

pub fn store1() -> Store {
    Store {
        store_id: 1,
        manager_staff_id: 1,
    }
}

pub fn language1() -> Language {
    Language {
        language_id: 1,
        name: "English".into(),
    }
}

/// Column list for `SELECT film.*, inventory.*, store.* FROM inventory ...`.
pub const JOIN_COLUMNS: [&str; 9] = [
    "inventory.inventory_id",
    "inventory.film_id",
    "inventory.store_id",
    "film.film_id",
    "film.title",
    "film.release_year",
    "film.rental_rate",
    "store.store_id",
    "store.manager_staff_id",
];

/// One row of the inventory/film/store join.
pub fn join_row(inventory_id: i32, film: &Film) -> Vec<Value> {
    row![
        inventory_id,
        film.film_id,
        Some(1_i16),
        film.film_id,
        film.title.clone(),
        film.release_year,
        film.rental_rate,
        1_i16,
        1_i16,
    ]
}

/// The join fixture: inventories 1-8 hold film 1, inventories 9-10 film 2,
/// all at store 1 — the fan-out a one-to-many join produces.
pub fn inventory_join_rows() -> MemoryRows {
    let rows = (1..=10)
        .map(|inventory_id| {
            let film = if inventory_id <= 8 { film1() } else { film2() };
            join_row(inventory_id, &film)
        })
        .collect::<Vec<_>>();
    MemoryRows::new(JOIN_COLUMNS, rows)
}
