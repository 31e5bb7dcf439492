//! Client-side task filtering.
//!
//! Every criterion is an independent predicate and a task must satisfy all
//! of them, so the order filters are applied in never changes the result.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::{Status, Task};

/// Relative date windows, anchored on today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Today,
    Yesterday,
    /// The last seven days and later.
    Week,
    /// One calendar month back and later.
    Month,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Today => "today",
            DateRange::Yesterday => "yesterday",
            DateRange::Week => "week",
            DateRange::Month => "month",
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateRange::Today => date == today,
            DateRange::Yesterday => today.checked_sub_days(Days::new(1)) == Some(date),
            DateRange::Week => date >= today.checked_sub_days(Days::new(7)).unwrap_or(NaiveDate::MIN),
            DateRange::Month => {
                // Month arithmetic clamps to the last valid day (Mar 31 -> Feb 28).
                let start = today.checked_sub_months(Months::new(1)).unwrap_or(NaiveDate::MIN);
                date >= start
            }
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(DateRange::Today),
            "yesterday" => Ok(DateRange::Yesterday),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            other => Err(Error::InvalidArgument(format!(
                "invalid date filter '{other}': must be today, yesterday, week or month"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateRange>,
    /// Case-insensitive substring of title, description or category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.status.is_none() && self.date.is_none() && self.search.is_none()
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if let Some(category) = &self.category {
            if !task.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(range) = self.date {
            if !range.contains(task.date, today) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = [&task.title, &task.description, &task.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Matching tasks, input order preserved.
    pub fn apply(&self, tasks: &[Task], today: NaiveDate) -> Vec<Task> {
        tasks
            .iter()
            .filter(|task| self.matches(task, today))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, category: &str, status: Status, date: NaiveDate, title: &str) -> Task {
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
        Task {
            id: id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            priority: Priority::Medium,
            time_spent: 1.0,
            description: format!("notes for {title}"),
            status,
            date,
            created_at: at,
            updated_at: at,
            user_id: "u1".to_string(),
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("a", "work", Status::Completed, day(2026, 10, 17), "Ship release"),
            task("b", "work", Status::Pending, day(2026, 10, 16), "Plan sprint"),
            task("c", "health", Status::Completed, day(2026, 10, 12), "Gym"),
            task("d", "learning", Status::InProgress, day(2026, 9, 20), "Read book"),
            task("e", "personal", Status::Pending, day(2026, 8, 1), "Taxes"),
            task("f", "work", Status::InProgress, day(2026, 10, 10), "Review PR"),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn filters() -> Vec<TaskFilter> {
        let mut out = vec![TaskFilter::default()];
        for category in ["work", "health"] {
            out.push(TaskFilter {
                category: Some(category.to_string()),
                ..TaskFilter::default()
            });
        }
        for status in Status::ALL {
            out.push(TaskFilter {
                status: Some(status),
                ..TaskFilter::default()
            });
        }
        for range in [DateRange::Today, DateRange::Yesterday, DateRange::Week, DateRange::Month] {
            out.push(TaskFilter {
                date: Some(range),
                ..TaskFilter::default()
            });
        }
        out.push(TaskFilter {
            search: Some("RE".to_string()),
            ..TaskFilter::default()
        });
        out
    }

    #[test]
    fn date_ranges() {
        let today = day(2026, 10, 17);
        let tasks = sample();
        let by = |range| ids(&TaskFilter { date: Some(range), ..TaskFilter::default() }.apply(&tasks, today)).join("");
        assert_eq!(by(DateRange::Today), "a");
        assert_eq!(by(DateRange::Yesterday), "b");
        assert_eq!(by(DateRange::Week), "abcf");
        assert_eq!(by(DateRange::Month), "abcdf");
    }

    #[test]
    fn month_window_clamps_short_months() {
        assert!(DateRange::Month.contains(day(2026, 2, 28), day(2026, 3, 31)));
        assert!(!DateRange::Month.contains(day(2026, 2, 27), day(2026, 3, 31)));
    }

    #[test]
    fn windows_at_earliest_date() {
        let first = NaiveDate::MIN;
        for range in [DateRange::Today, DateRange::Week, DateRange::Month] {
            assert!(range.contains(first, first), "{range}");
        }
        assert!(!DateRange::Yesterday.contains(first, first));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let today = day(2026, 10, 17);
        let filter = TaskFilter {
            search: Some("HEALTH".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter.apply(&sample(), today)), vec!["c"]);

        let filter = TaskFilter {
            search: Some("notes for plan".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter.apply(&sample(), today)), vec!["b"]);
    }

    #[test]
    fn combined_criteria_intersect() {
        let today = day(2026, 10, 17);
        let filter = TaskFilter {
            category: Some("Work".to_string()),
            status: Some(Status::InProgress),
            date: Some(DateRange::Week),
            search: None,
        };
        assert_eq!(ids(&filter.apply(&sample(), today)), vec!["f"]);
        assert!(!filter.is_empty());
        assert!(TaskFilter::default().is_empty());
    }

    #[test]
    fn filtering_is_commutative_and_idempotent() {
        let today = day(2026, 10, 17);
        let tasks = sample();
        let all = filters();
        for first in &all {
            let once = first.apply(&tasks, today);
            assert_eq!(first.apply(&once, today), once);
            for second in &all {
                let ab = second.apply(&first.apply(&tasks, today), today);
                let ba = first.apply(&second.apply(&tasks, today), today);
                assert_eq!(ab, ba, "{first:?} vs {second:?}");
            }
        }
    }

    #[test]
    fn parses_ranges() {
        assert_eq!("Week".parse::<DateRange>().unwrap(), DateRange::Week);
        assert!("fortnight".parse::<DateRange>().is_err());
    }
}
