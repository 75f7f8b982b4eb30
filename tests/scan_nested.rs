mod common;

use aquifer::prelude::*;
use common::*;

#[test]
fn flattened_structs_split_one_row() {
    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct InventoryDetail {
        #[aquifer(flatten)]
        inventory: Inventory,
        #[aquifer(flatten)]
        film: Film,
        #[aquifer(flatten)]
        store: Store,
    }

    let detail: InventoryDetail = scan_one(inventory_join_rows()).unwrap();
    assert_eq!(detail.inventory.inventory_id, 1);
    assert_eq!(detail.film, film1());
    assert_eq!(detail.store, store1());
}

#[test]
fn named_fields_bind_through_their_own_prefix() {
    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct FilmDetail {
        #[aquifer(flatten)]
        film: Film,
        language: Language,
        // "language2" prefixes nothing in the result: stays None.
        language2: Option<Language>,
        // Explicit prefix override, the embedding-tag analogue.
        #[aquifer(column = "language")]
        language3: Option<Language>,
    }

    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct InventoryDetail {
        #[aquifer(flatten)]
        inventory: Inventory,
        film: FilmDetail,
        store: Store,
    }

    let columns = [
        "inventory.inventory_id",
        "inventory.film_id",
        "inventory.store_id",
        "film.film_id",
        "film.title",
        "film.release_year",
        "film.rental_rate",
        "store.store_id",
        "store.manager_staff_id",
        "language.language_id",
        "language.name",
    ];
    let film = film1();
    let rows = MemoryRows::new(
        columns,
        vec![row![
            1,
            film.film_id,
            Some(1_i16),
            film.film_id,
            film.title.clone(),
            film.release_year,
            film.rental_rate,
            1_i16,
            1_i16,
            1_i16,
            "English",
        ]],
    );

    let detail: InventoryDetail = scan_one(rows).unwrap();
    assert_eq!(detail.film.film, film1());
    assert_eq!(detail.film.language, language1());
    assert_eq!(detail.film.language2, None);
    assert_eq!(detail.film.language3, Some(language1()));
    assert_eq!(detail.store, store1());
}

#[test]
fn optional_relation_is_none_when_all_its_columns_are_null() {
    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct Narrator {
        #[aquifer(unique)]
        actor_id: i32,
        first_name: Option<String>,
    }

    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct FilmWithNarrator {
        #[aquifer(flatten)]
        film: Film,
        narrator: Option<Narrator>,
    }

    let columns = [
        "film.film_id",
        "film.title",
        "film.release_year",
        "film.rental_rate",
        "narrator.actor_id",
        "narrator.first_name",
    ];
    let film = film1();

    // LEFT JOIN miss: every narrator column NULL.
    let rows = MemoryRows::new(
        columns,
        vec![row![
            film.film_id,
            film.title.clone(),
            film.release_year,
            film.rental_rate,
            None::<i32>,
            None::<String>,
        ]],
    );
    let dest: FilmWithNarrator = scan_one(rows).unwrap();
    assert_eq!(dest.narrator, None);

    // Any non-NULL column materializes the relation, even when the rest of
    // its fields are NULL.
    let rows = MemoryRows::new(
        columns,
        vec![row![
            film.film_id,
            film.title.clone(),
            film.release_year,
            film.rental_rate,
            7,
            None::<String>,
        ]],
    );
    let dest: FilmWithNarrator = scan_one(rows).unwrap();
    assert_eq!(
        dest.narrator,
        Some(Narrator {
            actor_id: 7,
            first_name: None,
        })
    );
}

#[test]
fn fan_out_collapses_into_nested_collections() {
    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct FilmInventories {
        #[aquifer(flatten)]
        film: Film,
        #[aquifer(column = "inventory")]
        inventories: Vec<Inventory>,
    }

    let films: Vec<FilmInventories> = scan_all(inventory_join_rows()).unwrap();
    assert_eq!(films.len(), 2);
    assert_eq!(films[0].film, film1());
    assert_eq!(films[0].inventories.len(), 8);
    assert_eq!(films[0].inventories[0].inventory_id, 1);
    assert_eq!(films[1].film, film2());
    assert_eq!(films[1].inventories.len(), 2);
    assert_eq!(films[1].inventories[1].inventory_id, 10);
}

#[test]
fn scalar_lists_append_one_value_per_row() {
    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct FilmInventoryIds {
        #[aquifer(flatten)]
        film: Film,
        #[aquifer(column = "inventory.inventory_id")]
        ids: Vec<i32>,
        #[aquifer(column = "inventory.inventory_id")]
        maybe_ids: Vec<Option<i32>>,
        // Unbound optional storage stays None rather than empty.
        other_ids: Option<Vec<i32>>,
    }

    let films: Vec<FilmInventoryIds> = scan_all(inventory_join_rows()).unwrap();
    assert_eq!(films.len(), 2);
    assert_eq!(films[0].ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(films[1].ids, vec![9, 10]);
    assert_eq!(films[1].maybe_ids, vec![Some(9), Some(10)]);
    assert_eq!(films[0].other_ids, None);
}

#[test]
fn collections_nest_to_arbitrary_depth() {
    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct AddressCustomer {
        #[aquifer(flatten)]
        address: Address,
        customer: Customer,
    }

    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct CityAddresses {
        #[aquifer(flatten)]
        city: City,
        #[aquifer(column = "address")]
        addresses: Vec<AddressCustomer>,
    }

    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct CountryCities {
        #[aquifer(flatten)]
        country: Country,
        #[aquifer(column = "city")]
        cities: Vec<CityAddresses>,
    }

    let columns = [
        "country.country_id",
        "country.country",
        "city.city_id",
        "city.city",
        "city.country_id",
        "address.address_id",
        "address.address",
        "address.city_id",
        "customer.customer_id",
        "customer.first_name",
        "customer.last_name",
    ];
    let uk_london_256 = row![
        102, "United Kingdom", 312, "London", 102, 256, "1497 Yuzhou Drive", 312, 252, "Mattie",
        "Hoffman"
    ];
    let uk_london_517 = row![
        102, "United Kingdom", 312, "London", 102, 517, "548 Uruapan Street", 312, 512, "Cecil",
        "Vines"
    ];
    let uk_leeds = row![
        102, "United Kingdom", 313, "Leeds", 102, 601, "1 Kirkstall Road", 313, 601, "Ada",
        "Pole"
    ];
    let us_dallas = row![
        103, "United States", 401, "Dallas", 103, 702, "9 Main Street", 401, 702, "Nina",
        "Ray"
    ];
    let rows = MemoryRows::new(
        columns,
        vec![uk_london_256, uk_london_517, uk_leeds, us_dallas],
    );

    let countries: Vec<CountryCities> = scan_all(rows).unwrap();
    assert_eq!(countries.len(), 2);

    let uk = &countries[0];
    assert_eq!(uk.country.country, "United Kingdom");
    assert_eq!(uk.cities.len(), 2);
    assert_eq!(uk.cities[0].city.city, "London");
    assert_eq!(uk.cities[0].addresses.len(), 2);
    assert_eq!(uk.cities[0].addresses[0].customer.first_name, "Mattie");
    assert_eq!(uk.cities[0].addresses[1].address.address, "548 Uruapan Street");
    assert_eq!(uk.cities[1].addresses.len(), 1);

    let us = &countries[1];
    assert_eq!(us.cities.len(), 1);
    assert_eq!(us.cities[0].addresses[0].customer.last_name, "Ray");
}

#[test]
fn inner_collections_grow_while_the_outer_key_repeats() {
    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct StoreInventories {
        #[aquifer(flatten)]
        store: Store,
        #[aquifer(column = "inventory")]
        inventories: Vec<Inventory>,
    }

    // Every row repeats store 1; the nested collection must still grow.
    let stores: Vec<StoreInventories> = scan_all(inventory_join_rows()).unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].store, store1());
    assert_eq!(stores[0].inventories.len(), 10);
}

#[test]
fn single_destination_feeds_nested_collections_from_matching_rows() {
    #[derive(Hydrate, Default, Debug, PartialEq)]
    struct FilmInventoryIds {
        #[aquifer(flatten)]
        film: Film,
        #[aquifer(column = "inventory.inventory_id")]
        ids: Vec<i32>,
    }

    // Rows 9-10 belong to film 2 and are ignored by the single destination.
    let film: FilmInventoryIds = scan_one(inventory_join_rows()).unwrap();
    assert_eq!(film.film, film1());
    assert_eq!(film.ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}
