//! Data access for the dashboards.
//!
//! [`DashboardStore`] lists every remote read and write the screens make.
//! [`SupabaseStore`] implements it with the table and function clients;
//! tests substitute an in-memory implementation.

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::functions::{FunctionInvokeOptions, DELETE_CLEANER, INVITE_CLEANER};
use crate::models::*;
use crate::postgrest::SortOrder;
use crate::Turnover;

pub const USERS: &str = "users";
pub const CLEANERS: &str = "cleaners";
pub const APARTMENTS: &str = "apartments";
pub const CLEANING_TASKS: &str = "cleaning_tasks";

/// Remote reads and writes used by the dashboards
#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>>;
    async fn create_user_profile(&self, profile: &NewUserProfile) -> Result<UserProfile>;

    async fn apartments_for_host(&self, host_id: Uuid) -> Result<Vec<Apartment>>;
    /// Apartments a cleaner's tasks point at
    async fn apartments_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Apartment>>;
    async fn insert_apartment(&self, apartment: &NewApartment) -> Result<Apartment>;
    async fn update_apartment(&self, id: Uuid, changes: &ApartmentChanges) -> Result<Apartment>;
    async fn delete_apartment(&self, id: Uuid) -> Result<()>;

    async fn cleaners_for_host(&self, host_id: Uuid) -> Result<Vec<Cleaner>>;
    async fn cleaner_for_user(&self, user_id: Uuid) -> Result<Option<Cleaner>>;
    async fn update_cleaner(&self, id: Uuid, changes: &CleanerChanges) -> Result<Cleaner>;
    /// Replace the cleaner's unavailable-date list in one write
    async fn set_unavailable_dates(&self, id: Uuid, dates: &[String]) -> Result<Cleaner>;
    /// Attach a new login to the pending cleaner row with this email
    async fn link_cleaner_account(&self, email: &str, user_id: Uuid) -> Result<Option<Cleaner>>;
    /// Create a cleaner and send the invitation (remote function)
    async fn invite_cleaner(&self, invite: &CleanerInvite) -> Result<Cleaner>;
    /// Delete a cleaner and everything depending on it (remote function)
    async fn delete_cleaner(&self, id: Uuid) -> Result<()>;

    async fn tasks_for_apartments(&self, apartment_ids: &[Uuid]) -> Result<Vec<CleaningTask>>;
    async fn tasks_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<CleaningTask>>;
    async fn insert_task(&self, task: &NewTask) -> Result<CleaningTask>;
    async fn update_task(&self, id: Uuid, changes: &TaskChanges) -> Result<CleaningTask>;
    async fn delete_task(&self, id: Uuid) -> Result<()>;
}

/// [`DashboardStore`] backed by the hosted project
pub struct SupabaseStore {
    client: Arc<Turnover>,
}

#[derive(Debug, Deserialize)]
struct InviteResponse {
    cleaner: Cleaner,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

fn first_row<T>(rows: Vec<T>, what: &str) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| Error::database(format!("{} not found or not accessible", what)))
}

impl SupabaseStore {
    pub fn new(client: Arc<Turnover>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Turnover {
        &self.client
    }

    async fn invoke_options(&self) -> Result<FunctionInvokeOptions> {
        let token = self.client.bearer().await?;
        Ok(FunctionInvokeOptions::new().with_auth(&token))
    }
}

#[async_trait]
impl DashboardStore for SupabaseStore {
    async fn user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.client
            .from(USERS)
            .await?
            .select("*")
            .eq("id", user_id)
            .execute_one()
            .await
    }

    async fn create_user_profile(&self, profile: &NewUserProfile) -> Result<UserProfile> {
        let rows = self
            .client
            .from(USERS)
            .await?
            .insert(profile)
            .execute()
            .await?;
        info!("created {} profile for {}", profile.role, profile.email);
        first_row(rows, "User")
    }

    async fn apartments_for_host(&self, host_id: Uuid) -> Result<Vec<Apartment>> {
        self.client
            .from(APARTMENTS)
            .await?
            .select("*")
            .eq("host_id", host_id)
            .order("name", SortOrder::Ascending)
            .execute()
            .await
    }

    async fn apartments_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Apartment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .from(APARTMENTS)
            .await?
            .select("*")
            .in_list("id", ids)
            .order("name", SortOrder::Ascending)
            .execute()
            .await
    }

    async fn insert_apartment(&self, apartment: &NewApartment) -> Result<Apartment> {
        let rows = self
            .client
            .from(APARTMENTS)
            .await?
            .insert(apartment)
            .execute()
            .await?;
        info!("created apartment {}", apartment.external_id);
        first_row(rows, "Apartment")
    }

    async fn update_apartment(&self, id: Uuid, changes: &ApartmentChanges) -> Result<Apartment> {
        let rows = self
            .client
            .from(APARTMENTS)
            .await?
            .update(changes)
            .eq("id", id)
            .execute()
            .await?;
        info!("updated apartment {}", id);
        first_row(rows, "Apartment")
    }

    async fn delete_apartment(&self, id: Uuid) -> Result<()> {
        self.client
            .from(APARTMENTS)
            .await?
            .delete()
            .eq("id", id)
            .execute_no_return()
            .await?;
        info!("deleted apartment {}", id);
        Ok(())
    }

    async fn cleaners_for_host(&self, host_id: Uuid) -> Result<Vec<Cleaner>> {
        self.client
            .from(CLEANERS)
            .await?
            .select("*")
            .eq("host_id", host_id)
            .order("full_name", SortOrder::Ascending)
            .execute()
            .await
    }

    async fn cleaner_for_user(&self, user_id: Uuid) -> Result<Option<Cleaner>> {
        self.client
            .from(CLEANERS)
            .await?
            .select("*")
            .eq("user_id", user_id)
            .execute_one()
            .await
    }

    async fn update_cleaner(&self, id: Uuid, changes: &CleanerChanges) -> Result<Cleaner> {
        let rows = self
            .client
            .from(CLEANERS)
            .await?
            .update(changes)
            .eq("id", id)
            .execute()
            .await?;
        info!("updated cleaner {}", id);
        first_row(rows, "Cleaner")
    }

    async fn set_unavailable_dates(&self, id: Uuid, dates: &[String]) -> Result<Cleaner> {
        let update = AvailabilityUpdate {
            availability: dates.to_vec(),
        };
        let rows = self
            .client
            .from(CLEANERS)
            .await?
            .update(&update)
            .eq("id", id)
            .execute()
            .await?;
        info!("cleaner {} now has {} unavailable dates", id, dates.len());
        first_row(rows, "Cleaner")
    }

    async fn link_cleaner_account(&self, email: &str, user_id: Uuid) -> Result<Option<Cleaner>> {
        let rows: Vec<Cleaner> = self
            .client
            .from(CLEANERS)
            .await?
            .update(CleanerLink { user_id })
            .eq("email", email.trim().to_lowercase())
            .is_null("user_id")
            .execute()
            .await?;
        debug!("linked {} cleaner rows to user {}", rows.len(), user_id);
        Ok(rows.into_iter().next())
    }

    async fn invite_cleaner(&self, invite: &CleanerInvite) -> Result<Cleaner> {
        let options = self.invoke_options().await?;
        let response: InviteResponse = self
            .client
            .functions()
            .invoke(INVITE_CLEANER, invite, &options)
            .await?;
        info!("invited cleaner {}", invite.email);
        Ok(response.cleaner)
    }

    async fn delete_cleaner(&self, id: Uuid) -> Result<()> {
        let options = self.invoke_options().await?;
        let response: DeleteResponse = self
            .client
            .functions()
            .invoke(DELETE_CLEANER, &serde_json::json!({ "cleaner_id": id }), &options)
            .await?;

        if !response.success {
            return Err(Error::function(
                response
                    .error
                    .unwrap_or_else(|| "The cleaner could not be deleted".to_string()),
            ));
        }
        info!("deleted cleaner {}", id);
        Ok(())
    }

    async fn tasks_for_apartments(&self, apartment_ids: &[Uuid]) -> Result<Vec<CleaningTask>> {
        if apartment_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .from(CLEANING_TASKS)
            .await?
            .select("*")
            .in_list("apartment_id", apartment_ids)
            .order("cleaning_date", SortOrder::Ascending)
            .execute()
            .await
    }

    async fn tasks_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<CleaningTask>> {
        self.client
            .from(CLEANING_TASKS)
            .await?
            .select("*")
            .eq("cleaner_id", cleaner_id)
            .order("cleaning_date", SortOrder::Ascending)
            .execute()
            .await
    }

    async fn insert_task(&self, task: &NewTask) -> Result<CleaningTask> {
        let rows = self
            .client
            .from(CLEANING_TASKS)
            .await?
            .insert(task)
            .execute()
            .await?;
        info!("scheduled cleaning on {} for apartment {}", task.cleaning_date, task.apartment_id);
        first_row(rows, "Task")
    }

    async fn update_task(&self, id: Uuid, changes: &TaskChanges) -> Result<CleaningTask> {
        let rows = self
            .client
            .from(CLEANING_TASKS)
            .await?
            .update(changes)
            .eq("id", id)
            .execute()
            .await?;
        info!("updated task {}", id);
        first_row(rows, "Task")
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        self.client
            .from(CLEANING_TASKS)
            .await?
            .delete()
            .eq("id", id)
            .execute_no_return()
            .await?;
        info!("deleted task {}", id);
        Ok(())
    }
}
