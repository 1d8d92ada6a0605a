use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entries::EntryLog;
use crate::progress::{ObjectivePace, PacingModel, ProgressBand};

pub const MIN_WEEKLY_TARGET: u8 = 1;
pub const MAX_WEEKLY_TARGET: u8 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target: u8,
    #[serde(default)]
    pub objective_id: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Objective {
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub objective_id: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub checked: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanItemKind {
    Goal,
    Objective,
    Task,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    pub kind: PlanItemKind,
    pub item_id: String,
}

/// A saved plan document. `content` is opaque to the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub items: Vec<PlanItem>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// First day the history table looks back to. Unset means "today".
    pub tracking_start_date: Option<NaiveDate>,
    pub threshold_green: i64,
    pub threshold_yellow: i64,
    pub streak_threshold: u32,
    pub pacing_model: PacingModel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tracking_start_date: None,
            threshold_green: 80,
            threshold_yellow: 50,
            streak_threshold: 2,
            pacing_model: PacingModel::default(),
        }
    }
}

impl Settings {
    pub fn tracking_start(&self, today: NaiveDate) -> NaiveDate {
        self.tracking_start_date.unwrap_or(today)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppData {
    pub goals: Vec<Goal>,
    pub entries: EntryLog,
    pub objectives: Vec<Objective>,
    pub milestones: Vec<Milestone>,
    pub tasks: Vec<Task>,
    pub plans: Vec<Plan>,
    pub settings: Settings,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub name: String,
    #[serde(default = "default_target")]
    pub target: i64,
    #[serde(default)]
    pub objective_id: Option<String>,
}

fn default_target() -> i64 {
    MAX_WEEKLY_TARGET as i64
}

#[derive(Debug, Deserialize)]
pub struct GoalObjectiveRequest {
    #[serde(default)]
    pub objective_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub goal_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub goal_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectiveDraft {
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectiveRequest {
    #[serde(flatten)]
    pub draft: ObjectiveDraft,
    #[serde(default)]
    pub goal_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    #[serde(default)]
    pub objective_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub checked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneDraft {
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub target_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanDraft {
    pub name: String,
    #[serde(default = "default_plan_category")]
    pub category: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub summary: Option<String>,
}

fn default_plan_category() -> String {
    "meal_plan".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub week: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub goal_id: String,
    pub date: NaiveDate,
    pub achieved: bool,
}

#[derive(Debug, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub achieved: bool,
    pub is_today: bool,
}

#[derive(Debug, Serialize)]
pub struct GoalRow {
    pub id: String,
    pub name: String,
    pub target: u8,
    pub objective_id: Option<String>,
    pub days: Vec<DayCell>,
    pub achieved: u32,
    pub percentage: i64,
    pub band: ProgressBand,
    /// Present only when the streak reaches the configured threshold.
    pub streak: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ObjectiveGoalProgress {
    pub goal_id: String,
    pub name: String,
    pub achieved: u32,
    pub expected: f64,
    pub current: i64,
    pub pace: i64,
    pub band: ProgressBand,
}

#[derive(Debug, Serialize)]
pub struct ObjectiveCard {
    pub id: String,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub goal_count: usize,
    pub progress: ObjectivePace,
    pub band: ProgressBand,
    pub goals: Vec<ObjectiveGoalProgress>,
}

#[derive(Debug, Serialize)]
pub struct MilestoneCard {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
    pub days_remaining: i64,
    pub percentage: i64,
    pub band: ProgressBand,
}

#[derive(Debug, Serialize)]
pub struct WeekOption {
    pub offset: i64,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub today: NaiveDate,
    pub week_offset: i64,
    pub week_dates: Vec<NaiveDate>,
    pub goals: Vec<GoalRow>,
    pub objectives: Vec<ObjectiveCard>,
    pub milestones: Vec<MilestoneCard>,
    pub tasks: Vec<Task>,
    pub week_options: Vec<WeekOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletedKind {
    Objective,
    Task,
    Plan,
}

#[derive(Debug, Serialize)]
pub struct CompletedItem {
    pub kind: CompletedKind,
    pub id: String,
    pub name: String,
    pub completed_at: DateTime<Utc>,
}
