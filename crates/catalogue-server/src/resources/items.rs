use chrono::{DateTime, Utc};
use serde::Deserialize;

use catalogue_core::{
    AvailableItem, AvailableItemFilter, Catalogue, KnownItem, KnownItemFilter, Repository,
    Validator,
};

use crate::patch::PatchField;
use crate::query::QueryParams;
use crate::resources::RestResource;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KnownItemPatch {
    pub serial_number: PatchField<i64>,
    pub long_name: PatchField<String>,
    pub short_name: PatchField<String>,
    pub tags: PatchField<Vec<String>>,
    pub item_type: PatchField<i64>,
    pub measurement: PatchField<i64>,
    pub container_size: PatchField<i32>,
}

impl RestResource for KnownItem {
    const COLLECTION: &'static str = "knownitems";
    const ENVELOPE: &'static str = "knownitem";

    type Patch = KnownItemPatch;

    fn apply_patch(&mut self, patch: KnownItemPatch) {
        patch.serial_number.apply_to(&mut self.serial_number);
        patch.long_name.apply_to(&mut self.long_name);
        patch.short_name.apply_to(&mut self.short_name);
        patch.tags.apply_to(&mut self.tags);
        patch.item_type.apply_to(&mut self.item_type);
        patch.measurement.apply_to(&mut self.measurement);
        patch.container_size.apply_to(&mut self.container_size);
    }

    fn filter_from_query(query: &QueryParams, v: &mut Validator) -> KnownItemFilter {
        KnownItemFilter {
            serial_number: query.int("serial_number", 0, v),
            long_name: query.string("long_name"),
            short_name: query.string("short_name"),
            tags: query.csv("tags"),
            item_type: query.int("item_type", 0, v),
            measurement: query.int("measurement", 0, v),
            container_size: query.int("container_size", 0, v),
        }
    }

    fn repository(catalogue: &Catalogue) -> &Repository<Self> {
        &catalogue.known_items
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvailableItemPatch {
    pub expiration_at: PatchField<Option<DateTime<Utc>>>,
    pub long_name: PatchField<String>,
    pub short_name: PatchField<String>,
    pub item_type: PatchField<i64>,
    pub measurement: PatchField<i64>,
    pub container_size: PatchField<i32>,
}

impl RestResource for AvailableItem {
    const COLLECTION: &'static str = "availableitems";
    const ENVELOPE: &'static str = "availableitem";

    type Patch = AvailableItemPatch;

    fn apply_patch(&mut self, patch: AvailableItemPatch) {
        patch.expiration_at.apply_to(&mut self.expiration_at);
        patch.long_name.apply_to(&mut self.long_name);
        patch.short_name.apply_to(&mut self.short_name);
        patch.item_type.apply_to(&mut self.item_type);
        patch.measurement.apply_to(&mut self.measurement);
        patch.container_size.apply_to(&mut self.container_size);
    }

    fn filter_from_query(query: &QueryParams, v: &mut Validator) -> AvailableItemFilter {
        AvailableItemFilter {
            expiration_at: query.timestamp("expiration_at", v),
            long_name: query.string("long_name"),
            short_name: query.string("short_name"),
            item_type: query.int("item_type", 0, v),
            measurement: query.int("measurement", 0, v),
            container_size: query.int("container_size", 0, v),
        }
    }

    fn repository(catalogue: &Catalogue) -> &Repository<Self> {
        &catalogue.available_items
    }
}
