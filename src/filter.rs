//! Task list filtering and cleaner conflict detection

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::calendar::{month_bounds, week_of};
use crate::error::{Error, Result};
use crate::models::{Cleaner, CleaningTask};

/// Preset date windows offered above the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuickFilter {
    #[default]
    All,
    Today,
    Tomorrow,
    /// Monday to Sunday of the current week
    ThisWeek,
    NextWeek,
    ThisMonth,
    /// Today and later
    Upcoming,
    /// Before today
    Past,
}

impl QuickFilter {
    pub const ALL: [QuickFilter; 8] = [
        QuickFilter::All,
        QuickFilter::Today,
        QuickFilter::Tomorrow,
        QuickFilter::ThisWeek,
        QuickFilter::NextWeek,
        QuickFilter::ThisMonth,
        QuickFilter::Upcoming,
        QuickFilter::Past,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuickFilter::All => "all",
            QuickFilter::Today => "today",
            QuickFilter::Tomorrow => "tomorrow",
            QuickFilter::ThisWeek => "this-week",
            QuickFilter::NextWeek => "next-week",
            QuickFilter::ThisMonth => "this-month",
            QuickFilter::Upcoming => "upcoming",
            QuickFilter::Past => "past",
        }
    }

    /// Inclusive bounds of the window; `None` on a side means open
    pub fn bounds(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self {
            QuickFilter::All => (None, None),
            QuickFilter::Today => (Some(today), Some(today)),
            QuickFilter::Tomorrow => match today.succ_opt() {
                Some(tomorrow) => (Some(tomorrow), Some(tomorrow)),
                None => (Some(today), Some(today)),
            },
            QuickFilter::ThisWeek => match week_of(today) {
                Ok(week) => (Some(week.start), Some(week.end)),
                Err(_) => (None, Some(today)),
            },
            QuickFilter::NextWeek => {
                let next = today
                    .checked_add_signed(Duration::days(7))
                    .and_then(|d| week_of(d).ok());
                match next {
                    Some(week) => (Some(week.start), Some(week.end)),
                    None => (Some(today), None),
                }
            }
            QuickFilter::ThisMonth => match month_bounds(today.year(), today.month0()) {
                Ok((first, last)) => (Some(first), Some(last)),
                Err(_) => (None, None),
            },
            QuickFilter::Upcoming => (Some(today), None),
            QuickFilter::Past => (None, Some(today.pred_opt().unwrap_or(today))),
        }
    }
}

impl fmt::Display for QuickFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuickFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        QuickFilter::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| Error::validation(format!("Unknown filter '{}'", s)))
    }
}

/// Everything the task list can be narrowed by
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub quick: QuickFilter,
    pub apartment_id: Option<Uuid>,
    pub cleaner_id: Option<Uuid>,
    /// Only tasks nobody is assigned to
    pub unassigned_only: bool,
    /// Custom lower bound, combined with the quick filter
    pub from: Option<NaiveDate>,
    /// Custom upper bound, combined with the quick filter
    pub to: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn quick(quick: QuickFilter) -> Self {
        Self {
            quick,
            ..Default::default()
        }
    }

    pub fn for_apartment(mut self, apartment_id: Uuid) -> Self {
        self.apartment_id = Some(apartment_id);
        self
    }

    pub fn for_cleaner(mut self, cleaner_id: Uuid) -> Self {
        self.cleaner_id = Some(cleaner_id);
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Reject a custom window whose start is after its end
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(Error::validation("The start date is after the end date"));
            }
        }
        Ok(())
    }

    pub fn matches(&self, task: &CleaningTask, today: NaiveDate) -> bool {
        let (quick_from, quick_to) = self.quick.bounds(today);
        let from = later(quick_from, self.from);
        let to = earlier(quick_to, self.to);

        if from.map_or(false, |f| task.cleaning_date < f) {
            return false;
        }
        if to.map_or(false, |t| task.cleaning_date > t) {
            return false;
        }
        if self.apartment_id.map_or(false, |id| task.apartment_id != id) {
            return false;
        }
        if self.cleaner_id.is_some() && task.cleaner_id != self.cleaner_id {
            return false;
        }
        if self.unassigned_only && task.cleaner_id.is_some() {
            return false;
        }
        true
    }

    /// Matching tasks ordered by cleaning date
    pub fn apply<'a>(&self, tasks: &'a [CleaningTask], today: NaiveDate) -> Vec<&'a CleaningTask> {
        let mut matching: Vec<&CleaningTask> =
            tasks.iter().filter(|t| self.matches(t, today)).collect();
        matching.sort_by(|a, b| {
            a.cleaning_date
                .cmp(&b.cleaning_date)
                .then_with(|| a.apartment_id.cmp(&b.apartment_id))
        });
        matching
    }
}

fn later(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn earlier(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// A task assigned to a cleaner who marked its date unavailable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConflict {
    pub task_id: Uuid,
    pub cleaner_id: Uuid,
    pub date: NaiveDate,
}

/// Tasks whose cleaner is unavailable on the cleaning date. Advisory only.
pub fn find_conflicts(tasks: &[CleaningTask], cleaners: &[Cleaner]) -> Vec<TaskConflict> {
    let by_id: HashMap<Uuid, &Cleaner> = cleaners.iter().map(|c| (c.id, c)).collect();

    tasks
        .iter()
        .filter_map(|task| {
            let cleaner = by_id.get(&task.cleaner_id?)?;
            cleaner
                .is_unavailable_on(task.cleaning_date)
                .then(|| TaskConflict {
                    task_id: task.id,
                    cleaner_id: cleaner.id,
                    date: task.cleaning_date,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(date: NaiveDate, cleaner_id: Option<Uuid>) -> CleaningTask {
        CleaningTask {
            id: Uuid::new_v4(),
            apartment_id: Uuid::new_v4(),
            cleaner_id,
            cleaning_date: date,
            deadline_date: None,
            note: None,
        }
    }

    #[test]
    fn test_this_week_selects_monday_to_sunday_window() {
        // Wednesday
        let today = d(2026, 10, 21);
        let tasks = vec![
            task(today, None),
            task(today + Duration::days(1), None),
            task(today + Duration::days(8), None),
        ];

        let selected = TaskFilter::quick(QuickFilter::ThisWeek).apply(&tasks, today);
        let dates: Vec<NaiveDate> = selected.iter().map(|t| t.cleaning_date).collect();
        assert_eq!(dates, vec![today, today + Duration::days(1)]);
    }

    #[test]
    fn test_this_week_on_sunday_excludes_tomorrow() {
        let sunday = d(2026, 10, 25);
        let tasks = vec![task(sunday, None), task(sunday + Duration::days(1), None)];
        let selected = TaskFilter::quick(QuickFilter::ThisWeek).apply(&tasks, sunday);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].cleaning_date, sunday);

        let next = TaskFilter::quick(QuickFilter::NextWeek).apply(&tasks, sunday);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].cleaning_date, sunday + Duration::days(1));
    }

    #[test]
    fn test_other_quick_filters() {
        let today = d(2026, 10, 19);
        let tasks = vec![
            task(d(2026, 10, 18), None),
            task(today, None),
            task(d(2026, 10, 20), None),
            task(d(2026, 11, 2), None),
        ];
        let count = |q| TaskFilter::quick(q).apply(&tasks, today).len();

        assert_eq!(count(QuickFilter::All), 4);
        assert_eq!(count(QuickFilter::Today), 1);
        assert_eq!(count(QuickFilter::Tomorrow), 1);
        assert_eq!(count(QuickFilter::ThisMonth), 3);
        assert_eq!(count(QuickFilter::Upcoming), 3);
        assert_eq!(count(QuickFilter::Past), 1);
    }

    #[test]
    fn test_custom_bounds_and_assignment_filters() {
        let today = d(2026, 10, 19);
        let cleaner = Uuid::new_v4();
        let tasks = vec![
            task(d(2026, 10, 20), Some(cleaner)),
            task(d(2026, 10, 21), None),
            task(d(2026, 10, 30), Some(cleaner)),
        ];

        let filter = TaskFilter::default()
            .for_cleaner(cleaner)
            .between(Some(d(2026, 10, 19)), Some(d(2026, 10, 25)));
        assert_eq!(filter.apply(&tasks, today).len(), 1);

        let unassigned = TaskFilter {
            unassigned_only: true,
            ..Default::default()
        };
        assert_eq!(unassigned.apply(&tasks, today).len(), 1);

        let apartment = tasks[2].apartment_id;
        assert_eq!(TaskFilter::default().for_apartment(apartment).apply(&tasks, today).len(), 1);

        let reversed = TaskFilter::default().between(Some(d(2026, 10, 25)), Some(d(2026, 10, 19)));
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_results_are_sorted_by_date() {
        let today = d(2026, 10, 19);
        let tasks = vec![task(d(2026, 10, 30), None), task(d(2026, 10, 20), None)];
        let sorted = TaskFilter::default().apply(&tasks, today);
        assert!(sorted[0].cleaning_date < sorted[1].cleaning_date);
    }

    #[test]
    fn test_quick_filter_parsing() {
        assert_eq!("this-week".parse::<QuickFilter>().unwrap(), QuickFilter::ThisWeek);
        assert_eq!("This_Month".parse::<QuickFilter>().unwrap(), QuickFilter::ThisMonth);
        assert!("fortnight".parse::<QuickFilter>().is_err());
        for q in QuickFilter::ALL {
            assert_eq!(q.to_string().parse::<QuickFilter>().unwrap(), q);
        }
    }

    #[test]
    fn test_conflicts_flag_unavailable_cleaner() {
        let cleaner = Cleaner {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            user_id: None,
            full_name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: None,
            hourly_rate: None,
            availability: vec!["2026-10-20".into()],
        };
        let tasks = vec![
            task(d(2026, 10, 20), Some(cleaner.id)),
            task(d(2026, 10, 21), Some(cleaner.id)),
            task(d(2026, 10, 20), None),
        ];

        let conflicts = find_conflicts(&tasks, &[cleaner.clone()]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].task_id, tasks[0].id);
        assert_eq!(conflicts[0].cleaner_id, cleaner.id);
    }
}
