//! Screen-level services.
//!
//! Each dashboard holds the rows its screens render, fetched for the
//! signed-in identity. Every action writes through the store and then
//! re-fetches everything; the cached rows are never patched in place.

mod cleaner;
mod host;

use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::access::Page;
use crate::auth::{Auth, LinkCredentials};
use crate::calendar::{month_matrix, month_title, DayCell};
use crate::error::{Error, Result};
use crate::filter::TaskFilter;
use crate::models::{Apartment, Cleaner, CleaningTask, NewUserProfile, Role, UserProfile};
use crate::store::DashboardStore;

pub use cleaner::CleanerDashboard;
pub use host::HostDashboard;

/// Shortest password the auth service accepts
pub const MIN_PASSWORD_LEN: usize = 6;

/// The signed-in user and their dashboard role
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub profile: UserProfile,
}

impl Identity {
    pub fn role(&self) -> Role {
        self.profile.role
    }

    /// Page to land on after signing in
    pub fn home(&self) -> Page {
        Page::home(self.profile.role)
    }
}

/// Sign in with email and password and load the dashboard profile
pub async fn sign_in<S: DashboardStore + ?Sized>(
    auth: &Auth,
    store: &S,
    email: &str,
    password: &str,
) -> Result<Identity> {
    let session = auth.sign_in_with_password(email, password).await?;
    let user_id = session.user_id()?;

    match store.user_profile(user_id).await? {
        Some(profile) => Ok(Identity { profile }),
        None => {
            auth.clear_session();
            Err(Error::auth("This account has no dashboard profile"))
        }
    }
}

/// Profile of whoever holds the current session, if anyone
pub async fn current_identity<S: DashboardStore + ?Sized>(
    auth: &Auth,
    store: &S,
) -> Result<Option<Identity>> {
    let session = match auth.get_session() {
        Some(session) => session,
        None => return Ok(None),
    };
    let profile = store.user_profile(session.user_id()?).await?;
    Ok(profile.map(|profile| Identity { profile }))
}

/// Check a new password and its confirmation before anything is sent
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "The password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    if password != confirmation {
        return Err(Error::validation("The passwords do not match"));
    }
    Ok(())
}

/// Finish the set-password flow started by an invitation or reset link.
///
/// The link's code or tokens become the session, the password is set, and
/// a pending cleaner row with the same email is linked to the new login.
pub async fn accept_invitation<S: DashboardStore + ?Sized>(
    auth: &Auth,
    store: &S,
    link: &str,
    password: &str,
    confirmation: &str,
) -> Result<Identity> {
    validate_new_password(password, confirmation)?;
    let credentials = LinkCredentials::parse(link)?;

    let session = auth.session_from_link(&credentials).await?;
    let user = auth.update_password(password).await?;
    let user_id = session.user_id()?;
    let email = user
        .email
        .or_else(|| session.email())
        .ok_or_else(|| Error::auth("The invitation has no email address"))?;

    let linked = store.link_cleaner_account(&email, user_id).await?;

    if let Some(profile) = store.user_profile(user_id).await? {
        return Ok(Identity { profile });
    }

    let cleaner = linked.ok_or_else(|| {
        Error::auth(format!("No pending invitation was found for {}", email))
    })?;
    let profile = store
        .create_user_profile(&NewUserProfile {
            id: user_id,
            email: email.clone(),
            full_name: Some(cleaner.full_name.clone()),
            role: Role::Cleaner,
        })
        .await?;
    info!("cleaner {} completed registration", email);

    Ok(Identity { profile })
}

/// One line of a task list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    pub task: CleaningTask,
    pub apartment_name: String,
    pub apartment_address: Option<String>,
    pub cleaner_name: Option<String>,
    /// The assigned cleaner marked the cleaning date unavailable
    pub conflict: bool,
}

/// One day of a month view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView {
    pub cell: DayCell,
    pub task_ids: Vec<Uuid>,
    /// Meaningful on the cleaner calendar: the day is marked unavailable
    pub unavailable: bool,
}

/// A month grid with tasks placed on their days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month0: u32,
    pub title: String,
    pub weeks: Vec<[DayView; 7]>,
}

impl MonthView {
    pub fn days(&self) -> impl Iterator<Item = &DayView> {
        self.weeks.iter().flatten()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayView> {
        self.days().find(|d| d.cell.date == date)
    }
}

pub(crate) fn build_month_view(
    year: i32,
    month0: u32,
    today: NaiveDate,
    tasks: &[CleaningTask],
    unavailable: impl Fn(NaiveDate) -> bool,
) -> Result<MonthView> {
    let mut by_date: HashMap<NaiveDate, Vec<Uuid>> = HashMap::new();
    for task in tasks {
        by_date.entry(task.cleaning_date).or_default().push(task.id);
    }

    let weeks = month_matrix(year, month0, today)?
        .into_iter()
        .map(|week| {
            week.map(|cell| DayView {
                task_ids: by_date.get(&cell.date).cloned().unwrap_or_default(),
                unavailable: unavailable(cell.date),
                cell,
            })
        })
        .collect();

    Ok(MonthView {
        year,
        month0,
        title: month_title(year, month0),
        weeks,
    })
}

pub(crate) fn build_rows(
    tasks: &[CleaningTask],
    filter: &TaskFilter,
    today: NaiveDate,
    apartments: &[Apartment],
    cleaners: &[Cleaner],
) -> Vec<TaskRow> {
    let apartments: HashMap<Uuid, &Apartment> = apartments.iter().map(|a| (a.id, a)).collect();
    let cleaners: HashMap<Uuid, &Cleaner> = cleaners.iter().map(|c| (c.id, c)).collect();

    filter
        .apply(tasks, today)
        .into_iter()
        .map(|task| {
            let apartment = apartments.get(&task.apartment_id);
            let cleaner = task.cleaner_id.and_then(|id| cleaners.get(&id));
            TaskRow {
                apartment_name: apartment
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| "Unknown apartment".to_string()),
                apartment_address: apartment.and_then(|a| a.address.clone()),
                cleaner_name: cleaner.map(|c| c.full_name.clone()),
                conflict: cleaner.map_or(false, |c| c.is_unavailable_on(task.cleaning_date)),
                task: task.clone(),
            }
        })
        .collect()
}
