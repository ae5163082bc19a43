#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use uuid::Uuid;

use turnover::error::{Error, Result};
use turnover::models::*;
use turnover::store::DashboardStore;

#[derive(Default)]
pub struct State {
    pub users: Vec<UserProfile>,
    pub apartments: Vec<Apartment>,
    pub cleaners: Vec<Cleaner>,
    pub tasks: Vec<CleaningTask>,
}

/// In-memory store; counts writes and can be told to fail every call or
/// only the reads
#[derive(Default)]
pub struct MemoryStore {
    pub state: Mutex<State>,
    pub writes: Mutex<usize>,
    pub offline: Mutex<bool>,
    /// Reads fail while writes still go through
    pub reads_failing: Mutex<bool>,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn profile(role: Role, email: &str) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: None,
        role,
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: UserProfile) -> UserProfile {
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_apartment(&self, host_id: Uuid, name: &str, default_cleaner_id: Option<Uuid>) -> Apartment {
        let apartment = Apartment {
            id: Uuid::new_v4(),
            host_id,
            external_id: format!("LIST-{}", name),
            name: name.to_string(),
            address: None,
            default_cleaner_id,
        };
        self.state.lock().unwrap().apartments.push(apartment.clone());
        apartment
    }

    pub fn add_cleaner(&self, host_id: Uuid, name: &str, user_id: Option<Uuid>) -> Cleaner {
        let cleaner = Cleaner {
            id: Uuid::new_v4(),
            host_id,
            user_id,
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            hourly_rate: None,
            availability: Vec::new(),
        };
        self.state.lock().unwrap().cleaners.push(cleaner.clone());
        cleaner
    }

    pub fn add_task(&self, apartment_id: Uuid, cleaner_id: Option<Uuid>, day: NaiveDate) -> CleaningTask {
        let task = CleaningTask {
            id: Uuid::new_v4(),
            apartment_id,
            cleaner_id,
            cleaning_date: day,
            deadline_date: None,
            note: None,
        };
        self.state.lock().unwrap().tasks.push(task.clone());
        task
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn cleaner(&self, id: Uuid) -> Cleaner {
        self.state
            .lock()
            .unwrap()
            .cleaners
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap()
    }

    fn check(&self) -> Result<()> {
        if *self.offline.lock().unwrap() {
            return Err(Error::Api {
                status: 503,
                message: "Service unavailable".into(),
            });
        }
        Ok(())
    }

    pub fn set_reads_failing(&self, failing: bool) {
        *self.reads_failing.lock().unwrap() = failing;
    }

    fn read(&self) -> Result<()> {
        self.check()?;
        if *self.reads_failing.lock().unwrap() {
            return Err(Error::Api {
                status: 504,
                message: "Gateway timeout".into(),
            });
        }
        Ok(())
    }

    fn write(&self) -> Result<()> {
        self.check()?;
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.read()?;
        Ok(self.state.lock().unwrap().users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn create_user_profile(&self, profile: &NewUserProfile) -> Result<UserProfile> {
        self.write()?;
        let user = UserProfile {
            id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            role: profile.role,
        };
        self.state.lock().unwrap().users.push(user.clone());
        Ok(user)
    }

    async fn apartments_for_host(&self, host_id: Uuid) -> Result<Vec<Apartment>> {
        self.read()?;
        let state = self.state.lock().unwrap();
        Ok(state.apartments.iter().filter(|a| a.host_id == host_id).cloned().collect())
    }

    async fn apartments_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Apartment>> {
        self.read()?;
        let state = self.state.lock().unwrap();
        Ok(state.apartments.iter().filter(|a| ids.contains(&a.id)).cloned().collect())
    }

    async fn insert_apartment(&self, apartment: &NewApartment) -> Result<Apartment> {
        self.write()?;
        let row = Apartment {
            id: Uuid::new_v4(),
            host_id: apartment.host_id,
            external_id: apartment.external_id.clone(),
            name: apartment.name.clone(),
            address: apartment.address.clone(),
            default_cleaner_id: apartment.default_cleaner_id,
        };
        self.state.lock().unwrap().apartments.push(row.clone());
        Ok(row)
    }

    async fn update_apartment(&self, id: Uuid, changes: &ApartmentChanges) -> Result<Apartment> {
        self.write()?;
        let mut state = self.state.lock().unwrap();
        let row = state.apartments.iter_mut().find(|a| a.id == id).ok_or_else(|| Error::database("missing"))?;
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(address) = &changes.address {
            row.address = address.clone();
        }
        if let Some(default) = changes.default_cleaner_id {
            row.default_cleaner_id = default;
        }
        Ok(row.clone())
    }

    async fn delete_apartment(&self, id: Uuid) -> Result<()> {
        self.write()?;
        let mut state = self.state.lock().unwrap();
        state.apartments.retain(|a| a.id != id);
        state.tasks.retain(|t| t.apartment_id != id);
        Ok(())
    }

    async fn cleaners_for_host(&self, host_id: Uuid) -> Result<Vec<Cleaner>> {
        self.read()?;
        let state = self.state.lock().unwrap();
        Ok(state.cleaners.iter().filter(|c| c.host_id == host_id).cloned().collect())
    }

    async fn cleaner_for_user(&self, user_id: Uuid) -> Result<Option<Cleaner>> {
        self.read()?;
        let state = self.state.lock().unwrap();
        Ok(state.cleaners.iter().find(|c| c.user_id == Some(user_id)).cloned())
    }

    async fn update_cleaner(&self, id: Uuid, changes: &CleanerChanges) -> Result<Cleaner> {
        self.write()?;
        let mut state = self.state.lock().unwrap();
        let row = state.cleaners.iter_mut().find(|c| c.id == id).ok_or_else(|| Error::database("missing"))?;
        if let Some(name) = &changes.full_name {
            row.full_name = name.clone();
        }
        if let Some(phone) = &changes.phone {
            row.phone = phone.clone();
        }
        if let Some(rate) = changes.hourly_rate {
            row.hourly_rate = rate;
        }
        Ok(row.clone())
    }

    async fn set_unavailable_dates(&self, id: Uuid, dates: &[String]) -> Result<Cleaner> {
        self.write()?;
        let mut state = self.state.lock().unwrap();
        let row = state.cleaners.iter_mut().find(|c| c.id == id).ok_or_else(|| Error::database("missing"))?;
        row.availability = dates.to_vec();
        Ok(row.clone())
    }

    async fn link_cleaner_account(&self, email: &str, user_id: Uuid) -> Result<Option<Cleaner>> {
        self.write()?;
        let mut state = self.state.lock().unwrap();
        let row = state
            .cleaners
            .iter_mut()
            .find(|c| c.email.eq_ignore_ascii_case(email) && c.user_id.is_none());
        Ok(row.map(|c| {
            c.user_id = Some(user_id);
            c.clone()
        }))
    }

    async fn invite_cleaner(&self, invite: &CleanerInvite) -> Result<Cleaner> {
        self.write()?;
        let cleaner = Cleaner {
            id: Uuid::new_v4(),
            host_id: invite.host_id,
            user_id: None,
            full_name: invite.full_name.clone(),
            email: invite.email.clone(),
            phone: invite.phone.clone(),
            hourly_rate: invite.hourly_rate,
            availability: Vec::new(),
        };
        self.state.lock().unwrap().cleaners.push(cleaner.clone());
        Ok(cleaner)
    }

    async fn delete_cleaner(&self, id: Uuid) -> Result<()> {
        self.write()?;
        let mut state = self.state.lock().unwrap();
        state.cleaners.retain(|c| c.id != id);
        for task in state.tasks.iter_mut().filter(|t| t.cleaner_id == Some(id)) {
            task.cleaner_id = None;
        }
        for apartment in state.apartments.iter_mut().filter(|a| a.default_cleaner_id == Some(id)) {
            apartment.default_cleaner_id = None;
        }
        Ok(())
    }

    async fn tasks_for_apartments(&self, apartment_ids: &[Uuid]) -> Result<Vec<CleaningTask>> {
        self.read()?;
        let state = self.state.lock().unwrap();
        Ok(state.tasks.iter().filter(|t| apartment_ids.contains(&t.apartment_id)).cloned().collect())
    }

    async fn tasks_for_cleaner(&self, cleaner_id: Uuid) -> Result<Vec<CleaningTask>> {
        self.read()?;
        let state = self.state.lock().unwrap();
        Ok(state.tasks.iter().filter(|t| t.cleaner_id == Some(cleaner_id)).cloned().collect())
    }

    async fn insert_task(&self, task: &NewTask) -> Result<CleaningTask> {
        self.write()?;
        let row = CleaningTask {
            id: Uuid::new_v4(),
            apartment_id: task.apartment_id,
            cleaner_id: task.cleaner_id,
            cleaning_date: task.cleaning_date,
            deadline_date: task.deadline_date,
            note: task.note.clone(),
        };
        self.state.lock().unwrap().tasks.push(row.clone());
        Ok(row)
    }

    async fn update_task(&self, id: Uuid, changes: &TaskChanges) -> Result<CleaningTask> {
        self.write()?;
        let mut state = self.state.lock().unwrap();
        let row = state.tasks.iter_mut().find(|t| t.id == id).ok_or_else(|| Error::database("missing"))?;
        if let Some(cleaner_id) = changes.cleaner_id {
            row.cleaner_id = cleaner_id;
        }
        if let Some(day) = changes.cleaning_date {
            row.cleaning_date = day;
        }
        if let Some(deadline) = changes.deadline_date {
            row.deadline_date = deadline;
        }
        if let Some(note) = &changes.note {
            row.note = note.clone();
        }
        Ok(row.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        self.write()?;
        self.state.lock().unwrap().tasks.retain(|t| t.id != id);
        Ok(())
    }
}
