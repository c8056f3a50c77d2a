use serde::Deserialize;

use catalogue_core::{
    Catalogue, ItemType, ItemTypeFilter, Measurement, MeasurementFilter, Repository, Tag,
    TagFilter, Validator,
};

use crate::patch::PatchField;
use crate::query::QueryParams;
use crate::resources::RestResource;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemTypePatch {
    pub name: PatchField<String>,
}

impl RestResource for ItemType {
    const COLLECTION: &'static str = "itemtypes";
    const ENVELOPE: &'static str = "itemtype";

    type Patch = ItemTypePatch;

    fn apply_patch(&mut self, patch: ItemTypePatch) {
        patch.name.apply_to(&mut self.name);
    }

    fn filter_from_query(query: &QueryParams, _: &mut Validator) -> ItemTypeFilter {
        ItemTypeFilter {
            name: query.string("name"),
        }
    }

    fn repository(catalogue: &Catalogue) -> &Repository<Self> {
        &catalogue.item_types
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasurementPatch {
    pub name: PatchField<String>,
}

impl RestResource for Measurement {
    const COLLECTION: &'static str = "measurements";
    const ENVELOPE: &'static str = "measurement";

    type Patch = MeasurementPatch;

    fn apply_patch(&mut self, patch: MeasurementPatch) {
        patch.name.apply_to(&mut self.name);
    }

    fn filter_from_query(query: &QueryParams, _: &mut Validator) -> MeasurementFilter {
        MeasurementFilter {
            name: query.string("name"),
        }
    }

    fn repository(catalogue: &Catalogue) -> &Repository<Self> {
        &catalogue.measurements
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagPatch {
    pub itemtype: PatchField<i64>,
    pub name: PatchField<String>,
}

impl RestResource for Tag {
    const COLLECTION: &'static str = "tags";
    const ENVELOPE: &'static str = "tag";

    type Patch = TagPatch;

    fn apply_patch(&mut self, patch: TagPatch) {
        patch.itemtype.apply_to(&mut self.itemtype);
        patch.name.apply_to(&mut self.name);
    }

    fn filter_from_query(query: &QueryParams, v: &mut Validator) -> TagFilter {
        TagFilter {
            itemtype: query.int("itemtype", 0, v),
            name: query.string("name"),
        }
    }

    fn repository(catalogue: &Catalogue) -> &Repository<Self> {
        &catalogue.tags
    }
}
