use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::{dates_of_week, week_label, week_start};
use crate::entries::EntryLog;
use crate::models::Goal;
use crate::progress::{percent, weekly_percentage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekSelection {
    /// Every week from the tracking start through the current week.
    AllInRange,
    /// Weeks where any goal has a check-in, plus the current week.
    #[default]
    WithData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryTable {
    /// Monday of each column, oldest first.
    pub weeks: Vec<NaiveDate>,
    pub labels: Vec<String>,
    pub per_goal: BTreeMap<String, Vec<i64>>,
    /// Mean of each goal's weekly percentages.
    pub per_goal_avg: BTreeMap<String, i64>,
    /// Mean across goals of their percentage in each week.
    pub per_week_avg: Vec<i64>,
    /// Sum of achieved over sum of targets in each week.
    pub per_week_total: Vec<i64>,
}

/// Mondays from the week containing `tracking_start` through the current
/// week, oldest first. A tracking start after today still yields the current
/// week.
pub fn weeks_in_range(tracking_start: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    let current = week_start(today);
    let first = week_start(tracking_start).min(current);
    let mut weeks = Vec::new();
    let mut monday = first;
    while monday <= current {
        weeks.push(monday);
        monday += Duration::weeks(1);
    }
    weeks
}

pub fn weeks_with_data(tracking_start: NaiveDate, today: NaiveDate, entries: &EntryLog) -> Vec<NaiveDate> {
    let current = week_start(today);
    weeks_in_range(tracking_start, today)
        .into_iter()
        .filter(|monday| *monday == current || entries.any_in(&dates_of_week(*monday)))
        .collect()
}

pub fn select_weeks(
    selection: WeekSelection,
    tracking_start: NaiveDate,
    today: NaiveDate,
    entries: &EntryLog,
) -> Vec<NaiveDate> {
    match selection {
        WeekSelection::AllInRange => weeks_in_range(tracking_start, today),
        WeekSelection::WithData => weeks_with_data(tracking_start, today, entries),
    }
}

pub fn history_table(
    goals: &[Goal],
    entries: &EntryLog,
    tracking_start: NaiveDate,
    today: NaiveDate,
    selection: WeekSelection,
) -> HistoryTable {
    let weeks = select_weeks(selection, tracking_start, today, entries);
    build_table(goals, entries, weeks)
}

pub fn build_table(goals: &[Goal], entries: &EntryLog, weeks: Vec<NaiveDate>) -> HistoryTable {
    let week_dates: Vec<[NaiveDate; 7]> = weeks.iter().map(|monday| dates_of_week(*monday)).collect();

    let mut per_goal = BTreeMap::new();
    let mut per_goal_avg = BTreeMap::new();
    for goal in goals {
        let series: Vec<i64> = week_dates
            .iter()
            .map(|dates| weekly_percentage(&goal.id, dates, goal.target, entries))
            .collect();
        per_goal_avg.insert(goal.id.clone(), mean(&series));
        per_goal.insert(goal.id.clone(), series);
    }

    let per_week_avg = (0..weeks.len())
        .map(|index| {
            let column: Vec<i64> = goals.iter().map(|goal| per_goal[&goal.id][index]).collect();
            mean(&column)
        })
        .collect();

    let per_week_total = week_dates
        .iter()
        .map(|dates| weekly_total(goals, dates, entries))
        .collect();

    HistoryTable {
        labels: weeks.iter().map(|monday| week_label(*monday)).collect(),
        weeks,
        per_goal,
        per_goal_avg,
        per_week_avg,
        per_week_total,
    }
}

/// Combined row across goals for one week: total achieved over total target.
pub fn weekly_total(goals: &[Goal], week_dates: &[NaiveDate], entries: &EntryLog) -> i64 {
    let (achieved, target) = goals.iter().fold((0u32, 0u32), |(achieved, target), goal| {
        (
            achieved + entries.count_in(&goal.id, week_dates),
            target + u32::from(goal.target),
        )
    });
    percent(f64::from(achieved), f64::from(target))
}

fn mean(values: &[i64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    (values.iter().sum::<i64>() as f64 / values.len() as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(id: &str, target: u8) -> Goal {
        Goal {
            id: id.to_string(),
            name: id.to_string(),
            target,
            objective_id: None,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_tracker_shows_only_current_week_with_data() {
        let today = date(2024, 1, 24);
        let start = today - Duration::weeks(3);
        let entries = EntryLog::new();

        assert_eq!(weeks_with_data(start, today, &entries), vec![date(2024, 1, 22)]);
        let all = weeks_in_range(start, today);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], date(2024, 1, 1));
        assert_eq!(all[3], date(2024, 1, 22));
    }

    #[test]
    fn tracking_start_mid_week_includes_that_week() {
        let weeks = weeks_in_range(date(2024, 1, 5), date(2024, 1, 9));
        assert_eq!(weeks, vec![date(2024, 1, 1), date(2024, 1, 8)]);
    }

    #[test]
    fn future_tracking_start_yields_current_week() {
        let weeks = weeks_in_range(date(2024, 3, 1), date(2024, 1, 9));
        assert_eq!(weeks, vec![date(2024, 1, 8)]);
    }

    #[test]
    fn weeks_with_data_skips_empty_past_weeks() {
        let today = date(2024, 1, 24);
        let mut entries = EntryLog::new();
        entries.mark("g", date(2024, 1, 3));
        let weeks = weeks_with_data(date(2024, 1, 1), today, &entries);
        assert_eq!(weeks, vec![date(2024, 1, 1), date(2024, 1, 22)]);
    }

    #[test]
    fn table_keeps_mean_and_ratio_of_sums_separate() {
        let goals = vec![goal("daily", 7), goal("once", 1)];
        let mut entries = EntryLog::new();
        // Week 1: daily 7/7, once 0/1. Week 2: daily 0/7, once 1/1.
        for day in 1..=7 {
            entries.mark("daily", date(2024, 1, day));
        }
        entries.mark("once", date(2024, 1, 10));

        let table = history_table(&goals, &entries, date(2024, 1, 1), date(2024, 1, 10), WeekSelection::AllInRange);

        assert_eq!(table.weeks, vec![date(2024, 1, 1), date(2024, 1, 8)]);
        assert_eq!(table.labels, vec!["Jan 1".to_string(), "Jan 8".to_string()]);
        assert_eq!(table.per_goal["daily"], vec![100, 0]);
        assert_eq!(table.per_goal["once"], vec![0, 100]);
        assert_eq!(table.per_goal_avg["daily"], 50);
        assert_eq!(table.per_goal_avg["once"], 50);
        assert_eq!(table.per_week_avg, vec![50, 50]);
        // 7 / 8 and 1 / 8.
        assert_eq!(table.per_week_total, vec![88, 13]);
    }

    #[test]
    fn table_without_goals_is_neutral() {
        let table = history_table(&[], &EntryLog::new(), date(2024, 1, 1), date(2024, 1, 10), WeekSelection::AllInRange);
        assert_eq!(table.weeks.len(), 2);
        assert!(table.per_goal.is_empty());
        assert!(table.per_goal_avg.is_empty());
        assert_eq!(table.per_week_avg, vec![0, 0]);
        assert_eq!(table.per_week_total, vec![0, 0]);
    }
}
