//! Partial-update bodies
//!
//! A field missing from a PATCH body keeps its stored value; a field present
//! in the body replaces it, even when the new value is empty or zero.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PatchField<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> PatchField<T> {
    /// Overwrite `target` when the field was sent.
    pub fn apply_to(self, target: &mut T) {
        if let PatchField::Present(value) = self {
            *target = value;
        }
    }
}

/// Only called for keys present in the body; absent keys take the
/// `#[serde(default)]` value.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for PatchField<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(PatchField::Present)
    }
}
