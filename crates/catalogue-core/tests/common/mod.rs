//! Shared fixtures for catalogue integration tests

#![allow(dead_code)]

use catalogue_core::{Catalogue, DatabaseConfig, ItemType, KnownItem, Measurement};
use tempfile::TempDir;

pub const ITEM_TYPES: [&str; 6] = ["Vegetable", "Fruit", "Dairy", "Meat", "Grain", "Spice"];
pub const MEASUREMENTS: [&str; 6] = ["Grams", "Kilograms", "Millilitres", "Litres", "Pieces", "Cups"];

/// A catalogue over a fresh database file. The directory lives as long as this value.
pub struct TestCatalogue {
    pub catalogue: Catalogue,
    pub config: DatabaseConfig,
    _dir: TempDir,
}

impl std::ops::Deref for TestCatalogue {
    type Target = Catalogue;

    fn deref(&self) -> &Catalogue {
        &self.catalogue
    }
}

pub fn config_in(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig::at(dir.path().join("catalogue.db"))
}

/// Open an empty catalogue with tuned settings.
pub fn open_with(tune: impl FnOnce(&mut DatabaseConfig)) -> TestCatalogue {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    tune(&mut config);
    let catalogue = Catalogue::open(&config).unwrap();
    TestCatalogue {
        catalogue,
        config,
        _dir: dir,
    }
}

/// Open a catalogue with item types and measurements 1..=6 in place.
pub async fn seeded() -> TestCatalogue {
    let catalogue = open_with(|_| {});
    for name in ITEM_TYPES {
        catalogue
            .item_types
            .insert(ItemType {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    for name in MEASUREMENTS {
        catalogue
            .measurements
            .insert(Measurement {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    catalogue
}

pub fn known_item(long_name: &str, short_name: &str, container_size: i32) -> KnownItem {
    KnownItem {
        long_name: long_name.to_string(),
        short_name: short_name.to_string(),
        item_type: 1,
        measurement: 2,
        container_size,
        ..Default::default()
    }
}

pub fn lettuce() -> KnownItem {
    known_item("Iceberg Lettuce", "Lettuce", 440)
}
