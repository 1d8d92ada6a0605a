use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Daily completion records, keyed first by goal id and then by date.
///
/// Only achieved days are stored; a missing date means "not achieved".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryLog {
    goals: BTreeMap<String, BTreeSet<NaiveDate>>,
}

impl EntryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_achieved(&self, goal_id: &str, date: NaiveDate) -> bool {
        self.goals
            .get(goal_id)
            .is_some_and(|dates| dates.contains(&date))
    }

    pub fn mark(&mut self, goal_id: &str, date: NaiveDate) {
        self.goals.entry(goal_id.to_string()).or_default().insert(date);
    }

    pub fn clear(&mut self, goal_id: &str, date: NaiveDate) {
        if let Some(dates) = self.goals.get_mut(goal_id) {
            dates.remove(&date);
            if dates.is_empty() {
                self.goals.remove(goal_id);
            }
        }
    }

    /// Removes the entry when present, inserts it otherwise. Returns the new
    /// state of the day.
    pub fn toggle(&mut self, goal_id: &str, date: NaiveDate) -> bool {
        if self.is_achieved(goal_id, date) {
            self.clear(goal_id, date);
            false
        } else {
            self.mark(goal_id, date);
            true
        }
    }

    pub fn remove_goal(&mut self, goal_id: &str) {
        self.goals.remove(goal_id);
    }

    pub fn count_in(&self, goal_id: &str, dates: &[NaiveDate]) -> u32 {
        dates
            .iter()
            .filter(|date| self.is_achieved(goal_id, **date))
            .count() as u32
    }

    /// Achieved days from `start` through `end`, both inclusive.
    pub fn count_between(&self, goal_id: &str, start: NaiveDate, end: NaiveDate) -> u32 {
        match self.goals.get(goal_id) {
            Some(dates) if start <= end => dates.range(start..=end).count() as u32,
            _ => 0,
        }
    }

    pub fn any_in(&self, dates: &[NaiveDate]) -> bool {
        self.goals
            .values()
            .any(|set| dates.iter().any(|date| set.contains(date)))
    }

    pub fn dates_for(&self, goal_id: &str) -> impl Iterator<Item = NaiveDate> + '_ {
        self.goals.get(goal_id).into_iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}
