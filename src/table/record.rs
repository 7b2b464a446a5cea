//! Cat record types
//!
//! A `CatRecord` is one row of the table. `CatFields` is the same record
//! without its id: what callers supply on create and on full replace.

use serde::{Deserialize, Serialize};

use super::errors::{TableError, TableResult};

/// The attribute fields of a cat, in column order.
///
/// Absent JSON keys deserialize as empty strings, so a missing field and an
/// empty field are rejected the same way by [`CatFields::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatFields {
    pub name: String,
    pub image: String,
    pub description: String,
    pub gender: String,
    pub observations: String,
}

impl CatFields {
    /// Create a field set from its five values
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        description: impl Into<String>,
        gender: impl Into<String>,
        observations: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            description: description.into(),
            gender: gender.into(),
            observations: observations.into(),
        }
    }

    /// Named view of the fields, in column order
    pub fn named(&self) -> [(&'static str, &str); 5] {
        [
            ("name", &self.name),
            ("image", &self.image),
            ("description", &self.description),
            ("gender", &self.gender),
            ("observations", &self.observations),
        ]
    }

    /// Rejects the first field that is empty after trimming.
    pub fn validate(&self) -> TableResult<()> {
        match self.named().iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(TableError::validation(*field)),
            None => Ok(()),
        }
    }
}

/// One persisted cat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatRecord {
    /// Store-assigned identifier, immutable once assigned
    pub id: u64,
    #[serde(flatten)]
    pub fields: CatFields,
}

impl CatRecord {
    pub fn new(id: u64, fields: CatFields) -> Self {
        Self { id, fields }
    }
}
