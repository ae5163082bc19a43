use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, required};
use crate::error::Result;

/// Row of the `apartments` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: Uuid,
    pub host_id: Uuid,
    /// Listing identifier chosen by the host; fixed once created
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub default_cleaner_id: Option<Uuid>,
}

/// Insert payload for the `apartments` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewApartment {
    pub host_id: Uuid,
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub default_cleaner_id: Option<Uuid>,
}

/// Form input for creating an apartment
#[derive(Debug, Clone, Default)]
pub struct ApartmentForm {
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub default_cleaner_id: Option<Uuid>,
}

impl ApartmentForm {
    pub fn into_new(self, host_id: Uuid) -> Result<NewApartment> {
        Ok(NewApartment {
            host_id,
            external_id: required(&self.external_id, "Listing ID")?,
            name: required(&self.name, "Name")?,
            address: non_blank(self.address.as_deref()),
            default_cleaner_id: self.default_cleaner_id,
        })
    }
}

/// Patch payload for the `apartments` table.
///
/// There is no `external_id` field: the listing identifier cannot change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApartmentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    /// `Some(None)` clears the default cleaner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_cleaner_id: Option<Option<Uuid>>,
}

impl ApartmentChanges {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            required(name, "Name")?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.default_cleaner_id.is_none()
    }
}
