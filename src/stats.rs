//! Summary statistics over a user's tasks.

use std::collections::{BTreeMap, HashSet};

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::task::{Status, Task};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    /// Hours.
    pub time_spent: f64,
    /// Consecutive days ending today with at least one task.
    pub streak: u32,
    pub by_status: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

impl Stats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let mut by_status: BTreeMap<String, usize> = Status::ALL
            .iter()
            .map(|status| (status.as_str().to_string(), 0))
            .collect();
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        for task in tasks {
            *by_status.entry(task.status.as_str().to_string()).or_default() += 1;
            *by_category.entry(task.category.clone()).or_default() += 1;
        }

        Self {
            total: tasks.len(),
            completed: tasks
                .iter()
                .filter(|task| task.status == Status::Completed)
                .count(),
            time_spent: tasks.iter().map(|task| task.time_spent).sum(),
            streak: streak(tasks, today),
            by_status,
            by_category,
        }
    }

    /// `3.5h` style rendering of the time total.
    pub fn time_spent_label(&self) -> String {
        format!("{:.1}h", self.time_spent)
    }
}

/// Walk back from `today` while each day has a task. Future-dated tasks
/// never extend the streak.
pub fn streak(tasks: &[Task], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = tasks.iter().map(|task| task.date).collect();
    let mut count = 0;
    let mut day = today;
    while days.contains(&day) {
        count += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    count
}
