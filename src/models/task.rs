use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, Apartment};
use crate::calendar::format_external;
use crate::error::{Error, Result};

/// Row of the `cleaning_tasks` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningTask {
    pub id: Uuid,
    pub apartment_id: Uuid,
    #[serde(default)]
    pub cleaner_id: Option<Uuid>,
    pub cleaning_date: NaiveDate,
    #[serde(default)]
    pub deadline_date: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Insert payload for the `cleaning_tasks` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub apartment_id: Uuid,
    pub cleaner_id: Option<Uuid>,
    pub cleaning_date: NaiveDate,
    pub deadline_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Form input for scheduling a cleaning
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub apartment_id: Uuid,
    /// Left empty to fall back to the apartment's default cleaner
    pub cleaner_id: Option<Uuid>,
    pub cleaning_date: NaiveDate,
    pub deadline_date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl TaskDraft {
    pub fn new(apartment_id: Uuid, cleaning_date: NaiveDate) -> Self {
        Self {
            apartment_id,
            cleaner_id: None,
            cleaning_date,
            deadline_date: None,
            note: None,
        }
    }

    /// Validate the draft against its apartment and pick the cleaner: the
    /// one chosen, else the apartment's default, else none.
    pub fn resolve(self, apartment: &Apartment) -> Result<NewTask> {
        if apartment.id != self.apartment_id {
            return Err(Error::validation("The task does not belong to this apartment"));
        }
        validate_deadline(self.cleaning_date, self.deadline_date)?;

        Ok(NewTask {
            apartment_id: self.apartment_id,
            cleaner_id: self.cleaner_id.or(apartment.default_cleaner_id),
            cleaning_date: self.cleaning_date,
            deadline_date: self.deadline_date,
            note: non_blank(self.note.as_deref()),
        })
    }
}

/// Patch payload for the `cleaning_tasks` table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaner_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaning_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
}

impl TaskChanges {
    /// Check the changes against the task they will be applied to
    pub fn validate_for(&self, task: &CleaningTask) -> Result<()> {
        let cleaning_date = self.cleaning_date.unwrap_or(task.cleaning_date);
        let deadline = match self.deadline_date {
            Some(deadline) => deadline,
            None => task.deadline_date,
        };
        validate_deadline(cleaning_date, deadline)
    }
}

fn validate_deadline(cleaning_date: NaiveDate, deadline: Option<NaiveDate>) -> Result<()> {
    match deadline {
        Some(deadline) if deadline < cleaning_date => Err(Error::validation(format!(
            "The deadline {} is before the cleaning date {}",
            format_external(deadline),
            format_external(cleaning_date)
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apartment(default_cleaner_id: Option<Uuid>) -> Apartment {
        Apartment {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            external_id: "AIR-1".into(),
            name: "Loft".into(),
            address: None,
            default_cleaner_id,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    #[test]
    fn test_default_cleaner_is_used_when_none_chosen() {
        let default = Uuid::new_v4();
        let apt = apartment(Some(default));
        let task = TaskDraft::new(apt.id, date(20)).resolve(&apt).unwrap();
        assert_eq!(task.cleaner_id, Some(default));
    }

    #[test]
    fn test_no_default_leaves_cleaner_unset() {
        let apt = apartment(None);
        let task = TaskDraft::new(apt.id, date(20)).resolve(&apt).unwrap();
        assert_eq!(task.cleaner_id, None);
    }

    #[test]
    fn test_chosen_cleaner_wins_over_default() {
        let chosen = Uuid::new_v4();
        let apt = apartment(Some(Uuid::new_v4()));
        let mut draft = TaskDraft::new(apt.id, date(20));
        draft.cleaner_id = Some(chosen);
        assert_eq!(draft.resolve(&apt).unwrap().cleaner_id, Some(chosen));
    }

    #[test]
    fn test_deadline_before_cleaning_date_is_rejected() {
        let apt = apartment(None);
        let mut draft = TaskDraft::new(apt.id, date(20));
        draft.deadline_date = Some(date(19));
        assert!(draft.resolve(&apt).unwrap_err().is_validation());
    }

    #[test]
    fn test_changes_validated_against_existing_task() {
        let task = CleaningTask {
            id: Uuid::new_v4(),
            apartment_id: Uuid::new_v4(),
            cleaner_id: None,
            cleaning_date: date(20),
            deadline_date: Some(date(21)),
            note: None,
        };
        let moved = TaskChanges {
            cleaning_date: Some(date(22)),
            ..Default::default()
        };
        assert!(moved.validate_for(&task).is_err());

        let moved_and_cleared = TaskChanges {
            cleaning_date: Some(date(22)),
            deadline_date: Some(None),
            ..Default::default()
        };
        assert!(moved_and_cleared.validate_for(&task).is_ok());
    }
}
