use chrono::NaiveDate;
use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use super::{build_month_view, build_rows, MonthView, TaskRow};
use crate::availability::{self, AvailabilityChange};
use crate::error::{Error, Result};
use crate::filter::{find_conflicts, TaskConflict, TaskFilter};
use crate::models::*;
use crate::store::DashboardStore;

/// Everything a host sees: their apartments, their cleaners and the tasks
/// scheduled for those apartments
pub struct HostDashboard<S: DashboardStore> {
    store: Arc<S>,
    host: UserProfile,
    invite_redirect: Option<String>,
    apartments: Vec<Apartment>,
    cleaners: Vec<Cleaner>,
    tasks: Vec<CleaningTask>,
}

impl<S: DashboardStore> HostDashboard<S> {
    /// Fetch the dashboard for a host profile
    pub async fn load(store: Arc<S>, host: UserProfile) -> Result<Self> {
        if host.role != Role::Host {
            return Err(Error::forbidden("Only hosts can open the host dashboard"));
        }

        let mut dashboard = Self {
            store,
            host,
            invite_redirect: None,
            apartments: Vec::new(),
            cleaners: Vec::new(),
            tasks: Vec::new(),
        };
        dashboard.refresh().await?;
        Ok(dashboard)
    }

    /// Where invitation links send the cleaner to set a password
    pub fn with_invite_redirect(mut self, redirect: Option<String>) -> Self {
        self.invite_redirect = redirect;
        self
    }

    /// Re-fetch every list; on failure the previous lists are kept
    pub async fn refresh(&mut self) -> Result<()> {
        let apartments = self.store.apartments_for_host(self.host.id).await?;
        let cleaners = self.store.cleaners_for_host(self.host.id).await?;
        let ids: Vec<Uuid> = apartments.iter().map(|a| a.id).collect();
        let tasks = self.store.tasks_for_apartments(&ids).await?;

        debug!(
            "host {} has {} apartments, {} cleaners, {} tasks",
            self.host.email,
            apartments.len(),
            cleaners.len(),
            tasks.len()
        );
        self.apartments = apartments;
        self.cleaners = cleaners;
        self.tasks = tasks;
        Ok(())
    }

    pub fn host(&self) -> &UserProfile {
        &self.host
    }

    pub fn apartments(&self) -> &[Apartment] {
        &self.apartments
    }

    pub fn cleaners(&self) -> &[Cleaner] {
        &self.cleaners
    }

    pub fn tasks(&self) -> &[CleaningTask] {
        &self.tasks
    }

    pub fn apartment(&self, id: Uuid) -> Option<&Apartment> {
        self.apartments.iter().find(|a| a.id == id)
    }

    pub fn cleaner(&self, id: Uuid) -> Option<&Cleaner> {
        self.cleaners.iter().find(|c| c.id == id)
    }

    pub fn task(&self, id: Uuid) -> Option<&CleaningTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn own_apartment(&self, id: Uuid) -> Result<&Apartment> {
        self.apartment(id)
            .ok_or_else(|| Error::forbidden("This apartment does not belong to you"))
    }

    fn own_cleaner(&self, id: Uuid) -> Result<&Cleaner> {
        self.cleaner(id)
            .ok_or_else(|| Error::forbidden("This cleaner does not belong to you"))
    }

    fn own_task(&self, id: Uuid) -> Result<&CleaningTask> {
        self.task(id)
            .ok_or_else(|| Error::forbidden("This task does not belong to you"))
    }

    fn check_assignable(&self, cleaner_id: Option<Uuid>) -> Result<()> {
        match cleaner_id {
            Some(id) if self.cleaner(id).is_none() => Err(Error::validation(
                "The selected cleaner is not one of your cleaners",
            )),
            _ => Ok(()),
        }
    }

    pub async fn create_apartment(&mut self, form: ApartmentForm) -> Result<Apartment> {
        let new = form.into_new(self.host.id)?;
        self.check_assignable(new.default_cleaner_id)?;
        if self.apartments.iter().any(|a| a.external_id == new.external_id) {
            return Err(Error::validation(format!(
                "An apartment with listing ID '{}' already exists",
                new.external_id
            )));
        }

        let apartment = self.store.insert_apartment(&new).await?;
        info!("host {} added apartment {}", self.host.email, apartment.name);
        self.refresh().await?;
        Ok(apartment)
    }

    pub async fn update_apartment(&mut self, id: Uuid, changes: ApartmentChanges) -> Result<Apartment> {
        self.own_apartment(id)?;
        changes.validate()?;
        if let Some(default) = changes.default_cleaner_id {
            self.check_assignable(default)?;
        }

        let apartment = self.store.update_apartment(id, &changes).await?;
        self.refresh().await?;
        Ok(apartment)
    }

    /// Delete an apartment; its tasks go with it
    pub async fn delete_apartment(&mut self, id: Uuid) -> Result<()> {
        self.own_apartment(id)?;
        self.store.delete_apartment(id).await?;
        self.refresh().await
    }

    /// Create the cleaner and email them an invitation
    pub async fn invite_cleaner(&mut self, form: CleanerForm) -> Result<Cleaner> {
        let invite = form.into_invite(self.host.id, self.invite_redirect.clone())?;
        if self.cleaners.iter().any(|c| c.email.eq_ignore_ascii_case(&invite.email)) {
            return Err(Error::validation(format!(
                "{} is already one of your cleaners",
                invite.email
            )));
        }

        let cleaner = self.store.invite_cleaner(&invite).await?;
        self.refresh().await?;
        Ok(cleaner)
    }

    pub async fn update_cleaner(&mut self, id: Uuid, changes: CleanerChanges) -> Result<Cleaner> {
        self.own_cleaner(id)?;
        changes.validate()?;

        let cleaner = self.store.update_cleaner(id, &changes).await?;
        self.refresh().await?;
        Ok(cleaner)
    }

    /// Delete a cleaner together with their login and assignments
    pub async fn delete_cleaner(&mut self, id: Uuid) -> Result<()> {
        let cleaner = self.own_cleaner(id)?;
        info!("host {} removes cleaner {}", self.host.email, cleaner.email);
        self.store.delete_cleaner(id).await?;
        self.refresh().await
    }

    /// Mark a range of a cleaner's days, typed as `DD/MM/YYYY`
    pub async fn set_cleaner_availability(
        &mut self,
        cleaner_id: Uuid,
        start: &str,
        end: &str,
        change: AvailabilityChange,
    ) -> Result<Cleaner> {
        let cleaner = self.own_cleaner(cleaner_id)?;
        let dates = availability::apply_range(&cleaner.availability, start, end, change)?;

        let saved = self.store.set_unavailable_dates(cleaner_id, &dates).await?;
        if let Some(cached) = self.cleaners.iter_mut().find(|c| c.id == cleaner_id) {
            *cached = saved.clone();
        }
        self.refresh().await?;
        Ok(saved)
    }

    /// Schedule a cleaning; without a chosen cleaner the apartment's default
    /// cleaner is assigned
    pub async fn create_task(&mut self, draft: TaskDraft) -> Result<CleaningTask> {
        self.check_assignable(draft.cleaner_id)?;
        let apartment = self.own_apartment(draft.apartment_id)?;
        let new = draft.resolve(apartment)?;

        let task = self.store.insert_task(&new).await?;
        self.refresh().await?;
        Ok(task)
    }

    pub async fn update_task(&mut self, id: Uuid, changes: TaskChanges) -> Result<CleaningTask> {
        changes.validate_for(self.own_task(id)?)?;
        if let Some(cleaner_id) = changes.cleaner_id {
            self.check_assignable(cleaner_id)?;
        }

        let task = self.store.update_task(id, &changes).await?;
        self.refresh().await?;
        Ok(task)
    }

    pub async fn delete_task(&mut self, id: Uuid) -> Result<()> {
        self.own_task(id)?;
        self.store.delete_task(id).await?;
        self.refresh().await
    }

    /// Task list rows matching the filter, with names resolved
    pub fn task_rows(&self, filter: &TaskFilter, today: NaiveDate) -> Vec<TaskRow> {
        build_rows(&self.tasks, filter, today, &self.apartments, &self.cleaners)
    }

    /// Month grid of all tasks. `month0` counts from 0 for January.
    pub fn month_view(&self, year: i32, month0: u32, today: NaiveDate) -> Result<MonthView> {
        build_month_view(year, month0, today, &self.tasks, |_| false)
    }

    /// Tasks whose assigned cleaner is unavailable that day
    pub fn conflicts(&self) -> Vec<TaskConflict> {
        find_conflicts(&self.tasks, &self.cleaners)
    }
}
