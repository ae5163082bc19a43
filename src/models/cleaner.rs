use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{non_blank, required};
use crate::availability;
use crate::error::{Error, Result};

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Row of the `cleaners` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cleaner {
    pub id: Uuid,
    pub host_id: Uuid,
    /// Set once the cleaner has accepted the invitation
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    /// Dates the cleaner is NOT available, as `YYYY-MM-DD` strings
    #[serde(default, deserialize_with = "null_as_empty")]
    pub availability: Vec<String>,
}

/// Whether a cleaner has a login yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Pending,
    Registered,
}

impl Cleaner {
    pub fn registration_status(&self) -> RegistrationStatus {
        if self.user_id.is_some() {
            RegistrationStatus::Registered
        } else {
            RegistrationStatus::Pending
        }
    }

    pub fn is_unavailable_on(&self, date: NaiveDate) -> bool {
        availability::is_unavailable(&self.availability, date)
    }
}

/// Body of the invitation function: creates the cleaner row and emails a
/// link to set a password
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanerInvite {
    pub host_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Form input for inviting a cleaner
#[derive(Debug, Clone, Default)]
pub struct CleanerForm {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub hourly_rate: Option<f64>,
}

impl CleanerForm {
    /// Validate the form into an invitation for `host_id`
    pub fn into_invite(self, host_id: Uuid, redirect_to: Option<String>) -> Result<CleanerInvite> {
        let full_name = required(&self.full_name, "Name")?;
        let email = required(&self.email, "Email")?.to_lowercase();
        if !email.contains('@') {
            return Err(Error::validation(format!("'{}' is not an email address", email)));
        }
        validate_rate(self.hourly_rate)?;

        Ok(CleanerInvite {
            host_id,
            full_name,
            email,
            phone: non_blank(self.phone.as_deref()),
            hourly_rate: self.hourly_rate,
            redirect_to,
        })
    }
}

/// Patch payload for the `cleaners` table; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanerChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Option<f64>>,
}

impl CleanerChanges {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.full_name {
            required(name, "Name")?;
        }
        if let Some(rate) = self.hourly_rate {
            validate_rate(rate)?;
        }
        Ok(())
    }
}

/// Patch payload that replaces the unavailable-date list wholesale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityUpdate {
    pub availability: Vec<String>,
}

/// Patch payload linking a pending cleaner to its new login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanerLink {
    pub user_id: Uuid,
}

fn validate_rate(rate: Option<f64>) -> Result<()> {
    match rate {
        Some(r) if !r.is_finite() || r < 0.0 => Err(Error::validation(
            "Hourly rate must be a positive number",
        )),
        _ => Ok(()),
    }
}
