use crate::calendar::{days_between, today, week_dates_from, week_label, weeks_between};
use crate::errors::TrackerError;
use crate::history::{HistoryTable, WeekSelection, history_table};
use crate::models::{
    AppData, DashboardResponse, DayCell, GoalRow, MilestoneCard, ObjectiveCard, ObjectiveGoalProgress, WeekOption,
};
use crate::progress::{
    Thresholds, aggregate_components, goal_components, milestone_percentage, streak, visible_streak, weekly_percentage,
};
use chrono::NaiveDate;

pub fn build_stats(data: &AppData, week_offset: i64) -> Result<DashboardResponse, TrackerError> {
    build_stats_at(today(), week_offset, data)
}

pub fn build_stats_at(today: NaiveDate, week_offset: i64, data: &AppData) -> Result<DashboardResponse, TrackerError> {
    let settings = &data.settings;
    let thresholds = Thresholds {
        green: settings.threshold_green,
        yellow: settings.threshold_yellow,
    };
    let week = week_dates_from(today, week_offset).ok_or(TrackerError::WeekOutOfRange(week_offset))?;
    let goals = data.sorted_goals();

    let goal_rows = goals
        .iter()
        .map(|goal| {
            let achieved = data.entries.count_in(&goal.id, &week);
            let percentage = weekly_percentage(&goal.id, &week, goal.target, &data.entries);
            GoalRow {
                id: goal.id.clone(),
                name: goal.name.clone(),
                target: goal.target,
                objective_id: goal.objective_id.clone(),
                days: week
                    .iter()
                    .map(|date| DayCell {
                        date: *date,
                        achieved: data.entries.is_achieved(&goal.id, *date),
                        is_today: *date == today,
                    })
                    .collect(),
                achieved,
                percentage,
                band: thresholds.classify(percentage),
                streak: visible_streak(streak(&goal.id, &data.entries, today), settings.streak_threshold),
            }
        })
        .collect();

    let objectives = data
        .active_objectives()
        .into_iter()
        .map(|objective| {
            let linked = data.goals_for_objective(&objective.id);
            let breakdown = linked
                .iter()
                .map(|goal| {
                    let components =
                        goal_components(goal, &objective, settings.pacing_model, &week, &data.entries, today);
                    let current = components.current();
                    ObjectiveGoalProgress {
                        goal_id: goal.id.clone(),
                        name: goal.name.clone(),
                        achieved: components.achieved,
                        expected: components.target_so_far,
                        current,
                        pace: components.pace(),
                        band: thresholds.classify(current),
                    }
                })
                .collect();
            let progress =
                aggregate_components(&linked, &objective, settings.pacing_model, &week, &data.entries, today).to_pace();

            ObjectiveCard {
                days_remaining: objective.target_date.map(|deadline| days_between(today, deadline)),
                goal_count: linked.len(),
                band: thresholds.classify(progress.current),
                progress,
                goals: breakdown,
                id: objective.id,
                name: objective.name,
                start_date: objective.start_date,
                target_date: objective.target_date,
            }
        })
        .collect();

    let milestones = data
        .milestones
        .iter()
        .map(|milestone| {
            let percentage = milestone_percentage(milestone, &goals, &data.entries, today);
            MilestoneCard {
                id: milestone.id.clone(),
                name: milestone.name.clone(),
                start_date: milestone.start_date,
                target_date: milestone.target_date,
                days_remaining: days_between(today, milestone.target_date),
                percentage,
                band: thresholds.classify(percentage),
            }
        })
        .collect();

    Ok(DashboardResponse {
        today,
        week_offset,
        week_dates: week.to_vec(),
        goals: goal_rows,
        objectives,
        milestones,
        tasks: data.active_tasks(),
        week_options: week_options(settings.tracking_start(today), today),
    })
}

/// Selectable weeks, newest first. Reaches back as many whole weeks as have
/// elapsed since the tracking start.
pub fn week_options(tracking_start: NaiveDate, today: NaiveDate) -> Vec<WeekOption> {
    let max_back = weeks_between(tracking_start, today).max(0);
    (0..=max_back)
        .filter_map(|back| {
            let dates = week_dates_from(today, -back)?;
            let mut label = format!("{} – {}", week_label(dates[0]), week_label(dates[6]));
            if back == 0 {
                label.push_str(" (now)");
            }
            Some(WeekOption { offset: -back, label })
        })
        .collect()
}

pub fn build_history(data: &AppData, selection: WeekSelection) -> HistoryTable {
    build_history_at(today(), data, selection)
}

pub fn build_history_at(today: NaiveDate, data: &AppData, selection: WeekSelection) -> HistoryTable {
    let goals = data.sorted_goals();
    history_table(
        &goals,
        &data.entries,
        data.settings.tracking_start(today),
        today,
        selection,
    )
}
