use chrono::NaiveDate;
use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use super::{build_month_view, build_rows, MonthView, TaskRow};
use crate::availability::{self, AvailabilityChange};
use crate::error::{Error, Result};
use crate::filter::TaskFilter;
use crate::models::*;
use crate::store::DashboardStore;

/// A cleaner's own view: their assignments and their unavailable days
pub struct CleanerDashboard<S: DashboardStore> {
    store: Arc<S>,
    user: UserProfile,
    cleaner: Cleaner,
    apartments: Vec<Apartment>,
    tasks: Vec<CleaningTask>,
}

impl<S: DashboardStore> CleanerDashboard<S> {
    /// Fetch the dashboard for a cleaner profile
    pub async fn load(store: Arc<S>, user: UserProfile) -> Result<Self> {
        if user.role != Role::Cleaner {
            return Err(Error::forbidden("Only cleaners can open the cleaner dashboard"));
        }
        let cleaner = store.cleaner_for_user(user.id).await?.ok_or_else(|| {
            Error::forbidden(format!("No cleaner record is linked to {}", user.email))
        })?;

        let mut dashboard = Self {
            store,
            user,
            cleaner,
            apartments: Vec::new(),
            tasks: Vec::new(),
        };
        dashboard.refresh().await?;
        Ok(dashboard)
    }

    /// Re-fetch the cleaner row and tasks; on failure the previous state is
    /// kept
    pub async fn refresh(&mut self) -> Result<()> {
        let cleaner = self
            .store
            .cleaner_for_user(self.user.id)
            .await?
            .ok_or_else(|| Error::forbidden("Your cleaner record is no longer available"))?;
        let tasks = self.store.tasks_for_cleaner(cleaner.id).await?;

        let mut ids: Vec<Uuid> = tasks.iter().map(|t| t.apartment_id).collect();
        ids.sort();
        ids.dedup();
        let apartments = self.store.apartments_by_ids(&ids).await?;

        debug!("cleaner {} has {} tasks", cleaner.email, tasks.len());
        self.cleaner = cleaner;
        self.tasks = tasks;
        self.apartments = apartments;
        Ok(())
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn cleaner(&self) -> &Cleaner {
        &self.cleaner
    }

    pub fn tasks(&self) -> &[CleaningTask] {
        &self.tasks
    }

    pub fn apartments(&self) -> &[Apartment] {
        &self.apartments
    }

    /// Stored unavailable dates, normalized
    pub fn unavailable_dates(&self) -> Vec<String> {
        availability::normalize(&self.cleaner.availability)
    }

    pub fn is_unavailable_on(&self, date: NaiveDate) -> bool {
        self.cleaner.is_unavailable_on(date)
    }

    /// Own task rows matching the filter
    pub fn task_rows(&self, filter: &TaskFilter, today: NaiveDate) -> Vec<TaskRow> {
        build_rows(
            &self.tasks,
            filter,
            today,
            &self.apartments,
            std::slice::from_ref(&self.cleaner),
        )
    }

    /// Month grid of own tasks with unavailable days flagged
    pub fn month_view(&self, year: i32, month0: u32, today: NaiveDate) -> Result<MonthView> {
        build_month_view(year, month0, today, &self.tasks, |date| {
            self.cleaner.is_unavailable_on(date)
        })
    }

    /// Mark an inclusive range typed as `DD/MM/YYYY`. Nothing is written
    /// when either date is invalid.
    pub async fn mark_range(
        &mut self,
        start: &str,
        end: &str,
        change: AvailabilityChange,
    ) -> Result<Vec<String>> {
        let dates = availability::apply_range(&self.cleaner.availability, start, end, change)?;
        self.save_availability(dates).await
    }

    /// Flip one day between available and unavailable
    pub async fn toggle_date(&mut self, date: NaiveDate) -> Result<Vec<String>> {
        let dates = availability::toggle_date(&self.cleaner.availability, date);
        self.save_availability(dates).await
    }

    async fn save_availability(&mut self, dates: Vec<String>) -> Result<Vec<String>> {
        let saved = self
            .store
            .set_unavailable_dates(self.cleaner.id, &dates)
            .await?;
        info!(
            "cleaner {} saved {} unavailable dates",
            saved.email,
            saved.availability.len()
        );
        // later edits start from the saved list even if the re-fetch fails
        self.cleaner = saved;
        self.refresh().await?;
        Ok(self.unavailable_dates())
    }
}
