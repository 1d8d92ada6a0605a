//! Progress numbers derived from goals, entries and a reference date.
//!
//! Every function here is pure: callers pass the snapshot and "today" in,
//! nothing is cached and nothing is clamped. Display code decides how to cap
//! progress bars.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{current_week, days_between, week_start};
use crate::entries::EntryLog;
use crate::models::{Goal, Milestone, Objective};

pub const MAX_STREAK_DAYS: u32 = 365;

pub fn percent(numerator: f64, denominator: f64) -> i64 {
    if denominator <= 0.0 {
        return 0;
    }
    (numerator / denominator * 100.0).round() as i64
}

pub fn weekly_percentage(goal_id: &str, week_dates: &[NaiveDate], target: u8, entries: &EntryLog) -> i64 {
    let achieved = entries.count_in(goal_id, week_dates);
    percent(f64::from(achieved), f64::from(target))
}

/// Consecutive achieved days ending today, or ending yesterday when today has
/// not been checked yet.
pub fn streak(goal_id: &str, entries: &EntryLog, today: NaiveDate) -> u32 {
    let mut day = if entries.is_achieved(goal_id, today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut count = 0;
    for _ in 0..MAX_STREAK_DAYS {
        if !entries.is_achieved(goal_id, day) {
            break;
        }
        count += 1;
        day = day - Duration::days(1);
    }
    count
}

pub fn visible_streak(streak: u32, threshold: u32) -> Option<u32> {
    (streak > 0 && streak >= threshold).then_some(streak)
}

/// Which formula turns an objective's check-ins into a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingModel {
    /// Achieved days against a fractional-week pro-rated target, with a
    /// projection to the deadline.
    #[default]
    FractionalWeek,
    /// Older formula: `expected = round(days_passed * target / 7)`, only when
    /// both start and deadline are set. No projection.
    RollingAverage,
    WeeklyRatio,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectivePace {
    pub current: i64,
    pub pace: i64,
}

/// Raw sums behind one goal's Current and Pace. Aggregation adds these up
/// before dividing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaceComponents {
    pub achieved: u32,
    pub target_so_far: f64,
    pub projected_total: f64,
    pub total_required: f64,
    /// False when no deadline applies; Pace then mirrors Current.
    pub has_projection: bool,
}

impl PaceComponents {
    pub fn current(&self) -> i64 {
        percent(f64::from(self.achieved), self.target_so_far)
    }

    pub fn pace(&self) -> i64 {
        if self.has_projection && self.total_required > 0.0 {
            percent(self.projected_total, self.total_required)
        } else {
            self.current()
        }
    }

    pub fn to_pace(&self) -> ObjectivePace {
        ObjectivePace {
            current: self.current(),
            pace: self.pace(),
        }
    }

    fn add(mut self, other: PaceComponents) -> Self {
        self.achieved += other.achieved;
        self.target_so_far += other.target_so_far;
        if other.has_projection && other.total_required > 0.0 {
            self.projected_total += other.projected_total;
            self.total_required += other.total_required;
            self.has_projection = true;
        } else {
            // No deadline for this goal: it contributes at its current ratio.
            self.projected_total += f64::from(other.achieved);
            self.total_required += other.target_so_far;
        }
        self
    }
}

pub fn weekly_components(goal: &Goal, week_dates: &[NaiveDate], entries: &EntryLog) -> PaceComponents {
    let achieved = entries.count_in(&goal.id, week_dates);
    PaceComponents {
        achieved,
        target_so_far: f64::from(goal.target),
        projected_total: f64::from(achieved),
        total_required: f64::from(goal.target),
        has_projection: false,
    }
}

pub fn fractional_week_components(
    goal: &Goal,
    start: NaiveDate,
    deadline: Option<NaiveDate>,
    entries: &EntryLog,
    today: NaiveDate,
) -> PaceComponents {
    let target = f64::from(goal.target);
    let days_elapsed = days_between(start, today) + 1;
    let achieved = entries.count_between(&goal.id, start, today);
    let target_so_far = days_elapsed as f64 / 7.0 * target;

    let mut components = PaceComponents {
        achieved,
        target_so_far,
        ..PaceComponents::default()
    };

    if let Some(deadline) = deadline {
        let total_days = (days_between(start, deadline) + 1) as f64;
        let daily_rate = if days_elapsed > 0 {
            f64::from(achieved) / days_elapsed as f64
        } else {
            0.0
        };
        components.projected_total = daily_rate * total_days;
        components.total_required = total_days / 7.0 * target;
        components.has_projection = true;
    }
    components
}

pub fn rolling_average_components(
    goal: &Goal,
    start: NaiveDate,
    entries: &EntryLog,
    today: NaiveDate,
) -> PaceComponents {
    let days_passed = days_between(start, today) + 1;
    let expected = (days_passed as f64 * (f64::from(goal.target) / 7.0)).round();
    let achieved = entries.count_between(&goal.id, start, today);
    PaceComponents {
        achieved,
        target_so_far: expected,
        projected_total: f64::from(achieved),
        total_required: expected,
        has_projection: false,
    }
}

pub fn goal_components(
    goal: &Goal,
    objective: &Objective,
    model: PacingModel,
    week_dates: &[NaiveDate],
    entries: &EntryLog,
    today: NaiveDate,
) -> PaceComponents {
    match (model, objective.start_date, objective.target_date) {
        (PacingModel::FractionalWeek, Some(start), deadline) => {
            fractional_week_components(goal, start, deadline, entries, today)
        }
        (PacingModel::RollingAverage, Some(start), Some(_)) => {
            rolling_average_components(goal, start, entries, today)
        }
        _ => weekly_components(goal, week_dates, entries),
    }
}

pub fn objective_pace(
    goal: &Goal,
    objective: &Objective,
    entries: &EntryLog,
    today: NaiveDate,
) -> ObjectivePace {
    let week = current_week(today);
    goal_components(goal, objective, PacingModel::FractionalWeek, &week, entries, today).to_pace()
}

/// Ratio-of-sums across goals: achieved and pro-rated targets are summed
/// before dividing, as are projections and requirements. Not the mean of the
/// per-goal percentages.
pub fn aggregate_components<'a>(
    goals: impl IntoIterator<Item = &'a Goal>,
    objective: &Objective,
    model: PacingModel,
    week_dates: &[NaiveDate],
    entries: &EntryLog,
    today: NaiveDate,
) -> PaceComponents {
    goals
        .into_iter()
        .map(|goal| goal_components(goal, objective, model, week_dates, entries, today))
        .fold(PaceComponents::default(), PaceComponents::add)
}

pub fn aggregate_objective_pace(
    goals: &[Goal],
    objective: &Objective,
    entries: &EntryLog,
    today: NaiveDate,
) -> ObjectivePace {
    let week = current_week(today);
    aggregate_components(goals, objective, PacingModel::FractionalWeek, &week, entries, today).to_pace()
}

/// Achieved days across all goals against whole weeks of expected check-ins
/// since the milestone's start week.
pub fn milestone_percentage(milestone: &Milestone, goals: &[Goal], entries: &EntryLog, today: NaiveDate) -> i64 {
    let weeks = days_between(week_start(milestone.start_date), week_start(today)).div_euclid(7) + 1;
    let weeks_count = weeks.max(1);

    let (achieved, expected) = goals.iter().fold((0u32, 0i64), |(achieved, expected), goal| {
        (
            achieved + entries.count_between(&goal.id, milestone.start_date, today),
            expected + i64::from(goal.target) * weeks_count,
        )
    });
    percent(f64::from(achieved), expected as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBand {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub green: i64,
    pub yellow: i64,
}

impl Thresholds {
    pub fn classify(&self, pct: i64) -> ProgressBand {
        if pct >= self.green {
            ProgressBand::Green
        } else if pct >= self.yellow {
            ProgressBand::Yellow
        } else {
            ProgressBand::Red
        }
    }
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
            objective_id: Some("o1".to_string()),
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    fn objective(start: Option<NaiveDate>, deadline: Option<NaiveDate>) -> Objective {
        Objective {
            id: "o1".to_string(),
            name: "Get fit".to_string(),
            start_date: start,
            target_date: deadline,
            sort_order: 0,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn mark_days(entries: &mut EntryLog, goal_id: &str, start: NaiveDate, days: &[i64]) {
        for offset in days {
            entries.mark(goal_id, start + Duration::days(*offset));
        }
    }

    #[test]
    fn weekly_percentage_depends_only_on_count() {
        let week = current_week(date(2024, 1, 10));
        for pattern in [[0usize, 1, 2], [2, 4, 6], [0, 3, 5]] {
            let mut entries = EntryLog::new();
            for index in pattern {
                entries.mark("g", week[index]);
            }
            assert_eq!(weekly_percentage("g", &week, 5, &entries), 60);
            assert_eq!(weekly_percentage("g", &week, 4, &entries), 75);
        }
    }

    #[test]
    fn weekly_percentage_rounds_half_up_and_tolerates_zero_target() {
        let week = current_week(date(2024, 1, 10));
        let mut entries = EntryLog::new();
        entries.mark("g", week[0]);
        // 1/8 would be 12.5; 1/6 is 16.67.
        assert_eq!(weekly_percentage("g", &week, 6, &entries), 17);
        assert_eq!(weekly_percentage("g", &week, 0, &entries), 0);
        assert_eq!(percent(1.0, 8.0), 13);
    }

    #[test]
    fn weekly_percentage_is_not_clamped() {
        let week = current_week(date(2024, 1, 10));
        let mut entries = EntryLog::new();
        for day in week {
            entries.mark("g", day);
        }
        assert_eq!(weekly_percentage("g", &week, 3, &entries), 233);
    }

    #[test]
    fn streak_is_zero_without_entries() {
        assert_eq!(streak("g", &EntryLog::new(), date(2024, 1, 10)), 0);
    }

    #[test]
    fn streak_counts_from_yesterday_when_today_is_unchecked() {
        let today = date(2024, 1, 10);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "g", today, &[-1, -2, -3, -5]);
        assert_eq!(streak("g", &entries, today), 3);

        entries.mark("g", today);
        assert_eq!(streak("g", &entries, today), 4);
    }

    #[test]
    fn streak_breaks_when_yesterday_is_missing() {
        let today = date(2024, 1, 10);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "g", today, &[-2, -3]);
        assert_eq!(streak("g", &entries, today), 0);
    }

    #[test]
    fn streak_grows_monotonically_over_a_continuous_run() {
        let start = date(2024, 1, 1);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "g", start, &(0..20).collect::<Vec<_>>());
        let mut previous = 0;
        for offset in 0..20 {
            let current = streak("g", &entries, start + Duration::days(offset));
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 20);
    }

    #[test]
    fn streak_is_capped() {
        let today = date(2024, 12, 31);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "g", today, &(-400..=0).collect::<Vec<_>>());
        assert_eq!(streak("g", &entries, today), MAX_STREAK_DAYS);
    }

    #[test]
    fn visible_streak_respects_threshold() {
        assert_eq!(visible_streak(1, 2), None);
        assert_eq!(visible_streak(2, 2), Some(2));
        assert_eq!(visible_streak(0, 0), None);
    }

    #[test]
    fn current_matches_reference_scenario() {
        let start = date(2024, 1, 1);
        let today = date(2024, 1, 8);
        let exercise = goal("exercise", 5);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "exercise", start, &[0, 1, 2, 3, 4, 7]);

        let pace = objective_pace(&exercise, &objective(Some(start), None), &entries, today);
        assert_eq!(pace.current, 105);
        assert_eq!(pace.pace, 105);
    }

    #[test]
    fn current_is_not_clamped() {
        let start = date(2024, 1, 1);
        let today = date(2024, 1, 7);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "g", start, &[0, 1, 2, 3, 4, 5, 6]);
        let pace = objective_pace(&goal("g", 2), &objective(Some(start), None), &entries, today);
        assert_eq!(pace.current, 350);
    }

    #[test]
    fn pace_equals_current_without_deadline() {
        let start = date(2024, 1, 1);
        let obj = objective(Some(start), None);
        for (target, days) in [(1u8, vec![0]), (3, vec![0, 2, 9, 10]), (7, vec![])] {
            let mut entries = EntryLog::new();
            mark_days(&mut entries, "g", start, &days);
            let pace = objective_pace(&goal("g", target), &obj, &entries, date(2024, 1, 12));
            assert_eq!(pace.pace, pace.current);
        }
    }

    #[test]
    fn pace_projects_daily_rate_to_deadline() {
        let start = date(2024, 1, 1);
        let deadline = date(2024, 1, 28);
        let today = date(2024, 1, 7);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "g", start, &[0, 2, 4]);

        let pace = objective_pace(&goal("g", 7), &objective(Some(start), Some(deadline)), &entries, today);
        // 3 of 7 days: current 3/7, projected 3/7 * 28 = 12 of 28 required.
        assert_eq!(pace.current, 43);
        assert_eq!(pace.pace, 43);

        let pace = objective_pace(&goal("g", 3), &objective(Some(start), Some(deadline)), &entries, today);
        // projected 12 of 12 required.
        assert_eq!(pace.current, 100);
        assert_eq!(pace.pace, 100);
    }

    #[test]
    fn pace_falls_back_to_current_for_inverted_deadline() {
        let start = date(2024, 1, 10);
        let obj = objective(Some(start), Some(date(2024, 1, 1)));
        let mut entries = EntryLog::new();
        entries.mark("g", start);
        let pace = objective_pace(&goal("g", 7), &obj, &entries, start);
        assert_eq!(pace.pace, pace.current);
    }

    #[test]
    fn objective_not_started_yields_zero() {
        let obj = objective(Some(date(2024, 2, 1)), Some(date(2024, 3, 1)));
        let pace = objective_pace(&goal("g", 3), &obj, &EntryLog::new(), date(2024, 1, 1));
        assert_eq!(pace, ObjectivePace { current: 0, pace: 0 });
    }

    #[test]
    fn missing_start_falls_back_to_current_week_ratio() {
        let today = date(2024, 1, 10);
        let week = current_week(today);
        let mut entries = EntryLog::new();
        entries.mark("g", week[0]);
        entries.mark("g", week[1]);
        entries.mark("g", week[0] - Duration::days(1));

        let pace = objective_pace(&goal("g", 4), &objective(None, Some(date(2024, 3, 1))), &entries, today);
        assert_eq!(pace, ObjectivePace { current: 50, pace: 50 });
    }

    #[test]
    fn aggregation_is_ratio_of_sums() {
        let start = date(2024, 1, 1);
        let today = date(2024, 1, 14);
        let obj = objective(Some(start), None);
        let daily = goal("daily", 7);
        let weekly = goal("weekly", 1);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "daily", start, &[0, 1, 2, 3, 4, 5, 6]);
        mark_days(&mut entries, "weekly", start, &[0, 7]);

        let first = objective_pace(&daily, &obj, &entries, today);
        let second = objective_pace(&weekly, &obj, &entries, today);
        assert_eq!(first.current, 50);
        assert_eq!(second.current, 100);

        let goals = vec![daily, weekly];
        let combined = aggregate_objective_pace(&goals, &obj, &entries, today);
        // (7 + 2) / (14 + 2) = 56.25%
        assert_eq!(combined.current, 56);
        assert_ne!(combined.current, (first.current + second.current) / 2);
        assert_eq!(combined.pace, combined.current);
    }

    #[test]
    fn aggregated_pace_sums_projections() {
        let start = date(2024, 1, 1);
        let deadline = date(2024, 1, 14);
        let today = date(2024, 1, 7);
        let obj = objective(Some(start), Some(deadline));
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "a", start, &[0, 1, 2, 3, 4, 5, 6]);
        mark_days(&mut entries, "b", start, &[]);

        let goals = vec![goal("a", 7), goal("b", 7)];
        let combined = aggregate_objective_pace(&goals, &obj, &entries, today);
        // projected 14 + 0 of 14 + 14 required.
        assert_eq!(combined.pace, 50);
        assert_eq!(combined.current, 50);
    }

    #[test]
    fn aggregation_of_no_goals_is_zero() {
        let obj = objective(Some(date(2024, 1, 1)), Some(date(2024, 2, 1)));
        let pace = aggregate_objective_pace(&[], &obj, &EntryLog::new(), date(2024, 1, 10));
        assert_eq!(pace, ObjectivePace::default());
    }

    #[test]
    fn rolling_average_rounds_expected_before_dividing() {
        let start = date(2024, 1, 1);
        let today = date(2024, 1, 8);
        let obj = objective(Some(start), Some(date(2024, 2, 1)));
        let exercise = goal("exercise", 5);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "exercise", start, &[0, 1, 2, 3, 4, 7]);
        let week = current_week(today);

        let rolling = goal_components(&exercise, &obj, PacingModel::RollingAverage, &week, &entries, today);
        // expected = round(8 * 5 / 7) = 6
        assert_eq!(rolling.target_so_far, 6.0);
        assert_eq!(rolling.current(), 100);

        let fractional = goal_components(&exercise, &obj, PacingModel::FractionalWeek, &week, &entries, today);
        assert_eq!(fractional.current(), 105);
    }

    #[test]
    fn rolling_average_without_deadline_uses_weekly_ratio() {
        let today = date(2024, 1, 10);
        let week = current_week(today);
        let mut entries = EntryLog::new();
        entries.mark("g", week[0]);
        let obj = objective(Some(date(2024, 1, 1)), None);
        let components = goal_components(&goal("g", 2), &obj, PacingModel::RollingAverage, &week, &entries, today);
        assert_eq!(components.current(), 50);
    }

    #[test]
    fn milestone_uses_whole_weeks_across_all_goals() {
        let milestone = Milestone {
            id: "m".to_string(),
            name: "Spring".to_string(),
            start_date: date(2024, 1, 3),
            target_date: date(2024, 3, 1),
        };
        let today = date(2024, 1, 10);
        let mut entries = EntryLog::new();
        mark_days(&mut entries, "a", date(2024, 1, 1), &[0, 2, 3, 4, 9]);
        mark_days(&mut entries, "b", date(2024, 1, 1), &[8]);

        let goals = vec![goal("a", 3), goal("b", 2)];
        // Two calendar weeks, expected (3 + 2) * 2 = 10; achieved 4 + 1.
        assert_eq!(milestone_percentage(&milestone, &goals, &entries, today), 50);
        assert_eq!(milestone_percentage(&milestone, &[], &entries, today), 0);
    }

    #[test]
    fn thresholds_classify_inclusively() {
        let thresholds = Thresholds { green: 80, yellow: 50 };
        assert_eq!(thresholds.classify(80), ProgressBand::Green);
        assert_eq!(thresholds.classify(79), ProgressBand::Yellow);
        assert_eq!(thresholds.classify(50), ProgressBand::Yellow);
        assert_eq!(thresholds.classify(49), ProgressBand::Red);
    }
}
