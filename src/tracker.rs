//! Mutations on the tracker snapshot.
//!
//! `AppData` is the single state container; the progress functions only ever
//! see it through shared references.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::calendar::to_iso_date;
use crate::errors::TrackerError;
use crate::models::{
    AppData, CompletedItem, CompletedKind, Goal, Milestone, MilestoneDraft, Objective, ObjectiveDraft, Plan, PlanDraft,
    PlanItem, PlanItemKind, Settings, Task, TaskDraft, MAX_WEEKLY_TARGET, MIN_WEEKLY_TARGET,
};

pub fn clamp_target(target: i64) -> u8 {
    target.clamp(i64::from(MIN_WEEKLY_TARGET), i64::from(MAX_WEEKLY_TARGET)) as u8
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn clean_name(name: &str) -> Result<String, TrackerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::EmptyName);
    }
    Ok(name.to_string())
}

fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), TrackerError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(TrackerError::InvalidDateRange {
            start: to_iso_date(start),
            end: to_iso_date(end),
        }),
        _ => Ok(()),
    }
}

impl AppData {
    pub fn sorted_goals(&self) -> Vec<Goal> {
        let mut goals = self.goals.clone();
        goals.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.created_at.cmp(&b.created_at)));
        goals
    }

    pub fn goal(&self, id: &str) -> Result<&Goal, TrackerError> {
        self.goals
            .iter()
            .find(|goal| goal.id == id)
            .ok_or_else(|| TrackerError::GoalNotFound(id.to_string()))
    }

    fn goal_mut(&mut self, id: &str) -> Result<&mut Goal, TrackerError> {
        self.goals
            .iter_mut()
            .find(|goal| goal.id == id)
            .ok_or_else(|| TrackerError::GoalNotFound(id.to_string()))
    }

    fn check_objective(&self, objective_id: Option<&str>) -> Result<(), TrackerError> {
        match objective_id {
            Some(id) if !self.objectives.iter().any(|o| o.id == id && o.is_active()) => {
                Err(TrackerError::ObjectiveNotFound(id.to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn add_goal(&mut self, name: &str, target: i64, objective_id: Option<String>) -> Result<Goal, TrackerError> {
        let name = clean_name(name)?;
        self.check_objective(objective_id.as_deref())?;

        let max_order = self.goals.iter().map(|g| g.sort_order).max().unwrap_or(0);
        let goal = Goal {
            id: new_id(),
            name,
            target: clamp_target(target),
            objective_id,
            sort_order: max_order + 1,
            created_at: Utc::now(),
        };
        info!(goal = %goal.id, name = %goal.name, target = goal.target, "goal added");
        self.goals.push(goal.clone());
        Ok(goal)
    }

    pub fn update_goal(
        &mut self,
        id: &str,
        name: &str,
        target: i64,
        objective_id: Option<String>,
    ) -> Result<Goal, TrackerError> {
        let name = clean_name(name)?;
        self.check_objective(objective_id.as_deref())?;

        let goal = self.goal_mut(id)?;
        goal.name = name;
        goal.target = clamp_target(target);
        goal.objective_id = objective_id;
        Ok(goal.clone())
    }

    pub fn set_goal_objective(&mut self, id: &str, objective_id: Option<String>) -> Result<(), TrackerError> {
        self.check_objective(objective_id.as_deref())?;
        self.goal_mut(id)?.objective_id = objective_id;
        Ok(())
    }

    pub fn delete_goal(&mut self, id: &str) -> Result<(), TrackerError> {
        self.goal(id)?;
        self.goals.retain(|goal| goal.id != id);
        self.entries.remove_goal(id);
        info!(goal = %id, "goal deleted");
        Ok(())
    }

    /// Assigns `sort_order` by position in `ids`. Goals not listed keep their
    /// relative order after the listed ones.
    pub fn reorder_goals(&mut self, ids: &[String]) -> Result<(), TrackerError> {
        for id in ids {
            self.goal(id)?;
        }
        let listed = ids.len() as i64;
        let mut rest: Vec<&mut Goal> = self.goals.iter_mut().filter(|g| !ids.contains(&g.id)).collect();
        rest.sort_by_key(|g| g.sort_order);
        for (index, goal) in rest.into_iter().enumerate() {
            goal.sort_order = listed + index as i64;
        }
        for goal in self.goals.iter_mut() {
            if let Some(position) = ids.iter().position(|id| *id == goal.id) {
                goal.sort_order = position as i64;
            }
        }
        Ok(())
    }

    pub fn toggle_entry(&mut self, goal_id: &str, date: NaiveDate) -> Result<bool, TrackerError> {
        self.goal(goal_id)?;
        Ok(self.entries.toggle(goal_id, date))
    }

    pub fn active_objectives(&self) -> Vec<Objective> {
        let mut objectives: Vec<Objective> = self.objectives.iter().filter(|o| o.is_active()).cloned().collect();
        objectives.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.created_at.cmp(&b.created_at)));
        objectives
    }

    pub fn goals_for_objective(&self, objective_id: &str) -> Vec<Goal> {
        self.sorted_goals()
            .into_iter()
            .filter(|goal| goal.objective_id.as_deref() == Some(objective_id))
            .collect()
    }

    fn objective_mut(&mut self, id: &str) -> Result<&mut Objective, TrackerError> {
        self.objectives
            .iter_mut()
            .find(|o| o.id == id && o.is_active())
            .ok_or_else(|| TrackerError::ObjectiveNotFound(id.to_string()))
    }

    fn unlink_goals(&mut self, objective_id: &str) {
        for goal in self.goals.iter_mut() {
            if goal.objective_id.as_deref() == Some(objective_id) {
                goal.objective_id = None;
            }
        }
    }

    fn release_objective(&mut self, objective_id: &str) {
        self.unlink_goals(objective_id);
        for task in self.tasks.iter_mut() {
            if task.objective_id.as_deref() == Some(objective_id) {
                task.objective_id = None;
            }
        }
    }

    /// Creates or updates an objective, then makes `goal_ids` exactly the set of
    /// goals linked to it.
    pub fn save_objective(
        &mut self,
        draft: ObjectiveDraft,
        existing_id: Option<&str>,
        goal_ids: &[String],
    ) -> Result<Objective, TrackerError> {
        let name = clean_name(&draft.name)?;
        check_range(draft.start_date, draft.target_date)?;
        for id in goal_ids {
            self.goal(id)?;
        }

        let objective = match existing_id {
            Some(id) => {
                let objective = self.objective_mut(id)?;
                objective.name = name;
                objective.start_date = draft.start_date;
                objective.target_date = draft.target_date;
                objective.clone()
            }
            None => {
                let max_order = self.objectives.iter().map(|o| o.sort_order).max().unwrap_or(0);
                let objective = Objective {
                    id: new_id(),
                    name,
                    start_date: draft.start_date,
                    target_date: draft.target_date,
                    sort_order: max_order + 1,
                    created_at: Utc::now(),
                    completed_at: None,
                };
                self.objectives.push(objective.clone());
                objective
            }
        };

        self.unlink_goals(&objective.id);
        for goal in self.goals.iter_mut() {
            if goal_ids.contains(&goal.id) {
                goal.objective_id = Some(objective.id.clone());
            }
        }
        info!(objective = %objective.id, goals = goal_ids.len(), "objective saved");
        Ok(objective)
    }

    pub fn delete_objective(&mut self, id: &str) -> Result<(), TrackerError> {
        if !self.objectives.iter().any(|o| o.id == id) {
            return Err(TrackerError::ObjectiveNotFound(id.to_string()));
        }
        self.release_objective(id);
        self.objectives.retain(|o| o.id != id);
        info!(objective = %id, "objective deleted");
        Ok(())
    }

    /// Marks the objective done and releases its goals and tasks. The record is
    /// kept for the trophy case.
    pub fn complete_objective(&mut self, id: &str, at: DateTime<Utc>) -> Result<Objective, TrackerError> {
        let objective = self.objective_mut(id)?;
        objective.completed_at = Some(at);
        let objective = objective.clone();
        self.release_objective(id);
        info!(objective = %id, "objective completed");
        Ok(objective)
    }

    pub fn active_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.iter().filter(|t| t.completed_at.is_none()).cloned().collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task, TrackerError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id && t.completed_at.is_none())
            .ok_or_else(|| TrackerError::TaskNotFound(id.to_string()))
    }

    pub fn add_task(&mut self, draft: TaskDraft, today: NaiveDate) -> Result<Task, TrackerError> {
        let name = clean_name(&draft.name)?;
        self.check_objective(draft.objective_id.as_deref())?;
        let start_date = draft.start_date.unwrap_or(today);
        check_range(Some(start_date), draft.target_date)?;

        let task = Task {
            id: new_id(),
            name,
            objective_id: draft.objective_id,
            start_date,
            target_date: draft.target_date,
            checked: false,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, draft: TaskDraft) -> Result<Task, TrackerError> {
        let name = clean_name(&draft.name)?;
        if self.task_mut(id)?.objective_id != draft.objective_id {
            self.check_objective(draft.objective_id.as_deref())?;
        }

        let task = self.task_mut(id)?;
        let start_date = draft.start_date.unwrap_or(task.start_date);
        check_range(Some(start_date), draft.target_date)?;
        task.name = name;
        task.objective_id = draft.objective_id;
        task.start_date = start_date;
        task.target_date = draft.target_date;
        Ok(task.clone())
    }

    /// Visual check only; the task stays active until archived.
    pub fn set_task_checked(&mut self, id: &str, checked: bool) -> Result<Task, TrackerError> {
        let task = self.task_mut(id)?;
        task.checked = checked;
        Ok(task.clone())
    }

    pub fn archive_task(&mut self, id: &str, at: DateTime<Utc>) -> Result<Task, TrackerError> {
        let task = self.task_mut(id)?;
        task.completed_at = Some(at);
        info!(task = %id, "task archived");
        Ok(task.clone())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<(), TrackerError> {
        if !self.tasks.iter().any(|t| t.id == id) {
            return Err(TrackerError::TaskNotFound(id.to_string()));
        }
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    pub fn save_milestone(
        &mut self,
        draft: MilestoneDraft,
        existing_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<Milestone, TrackerError> {
        let name = clean_name(&draft.name)?;
        let start_date = draft.start_date.unwrap_or(today);
        check_range(Some(start_date), Some(draft.target_date))?;

        let milestone = match existing_id {
            Some(id) => {
                let milestone = self
                    .milestones
                    .iter_mut()
                    .find(|m| m.id == id)
                    .ok_or_else(|| TrackerError::MilestoneNotFound(id.to_string()))?;
                milestone.name = name;
                milestone.start_date = start_date;
                milestone.target_date = draft.target_date;
                milestone.clone()
            }
            None => {
                let milestone = Milestone {
                    id: new_id(),
                    name,
                    start_date,
                    target_date: draft.target_date,
                };
                self.milestones.push(milestone.clone());
                milestone
            }
        };
        self.milestones.sort_by_key(|m| m.target_date);
        Ok(milestone)
    }

    pub fn delete_milestone(&mut self, id: &str) -> Result<(), TrackerError> {
        if !self.milestones.iter().any(|m| m.id == id) {
            return Err(TrackerError::MilestoneNotFound(id.to_string()));
        }
        self.milestones.retain(|m| m.id != id);
        Ok(())
    }

    pub fn active_plans(&self) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self.plans.iter().filter(|p| p.archived_at.is_none()).cloned().collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        plans
    }

    fn plan_mut(&mut self, id: &str) -> Result<&mut Plan, TrackerError> {
        self.plans
            .iter_mut()
            .find(|p| p.id == id && p.archived_at.is_none())
            .ok_or_else(|| TrackerError::PlanNotFound(id.to_string()))
    }

    pub fn save_plan(&mut self, draft: PlanDraft) -> Result<Plan, TrackerError> {
        let name = clean_name(&draft.name)?;
        let category = match draft.category.trim() {
            "" => "meal_plan".to_string(),
            category => category.to_string(),
        };
        let plan = Plan {
            id: new_id(),
            name,
            category,
            content: draft.content,
            summary: draft.summary,
            items: Vec::new(),
            created_at: Utc::now(),
            archived_at: None,
        };
        info!(plan = %plan.id, category = %plan.category, "plan saved");
        self.plans.push(plan.clone());
        Ok(plan)
    }

    pub fn archive_plan(&mut self, id: &str, at: DateTime<Utc>) -> Result<Plan, TrackerError> {
        let plan = self.plan_mut(id)?;
        plan.archived_at = Some(at);
        info!(plan = %id, "plan archived");
        Ok(plan.clone())
    }

    /// Records that a goal, objective or task was created from the plan.
    /// Linking the same item twice is a no-op.
    pub fn link_plan_item(&mut self, plan_id: &str, item: PlanItem) -> Result<Plan, TrackerError> {
        match item.kind {
            PlanItemKind::Goal => {
                self.goal(&item.item_id)?;
            }
            PlanItemKind::Objective => self.check_objective(Some(item.item_id.as_str()))?,
            PlanItemKind::Task => {
                if !self.tasks.iter().any(|t| t.id == item.item_id) {
                    return Err(TrackerError::TaskNotFound(item.item_id));
                }
            }
        }

        let plan = self.plan_mut(plan_id)?;
        if !plan.items.contains(&item) {
            plan.items.push(item);
        }
        Ok(plan.clone())
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<Settings, TrackerError> {
        if settings.threshold_green < settings.threshold_yellow {
            return Err(TrackerError::InvalidThresholds {
                green: settings.threshold_green,
                yellow: settings.threshold_yellow,
            });
        }
        self.settings = settings;
        info!(pacing = ?self.settings.pacing_model, "settings updated");
        Ok(self.settings.clone())
    }

    /// Completed objectives, archived tasks and archived plans, newest first.
    pub fn completed_items(&self) -> Vec<CompletedItem> {
        let objectives = self.objectives.iter().filter_map(|o| {
            o.completed_at.map(|completed_at| CompletedItem {
                kind: CompletedKind::Objective,
                id: o.id.clone(),
                name: o.name.clone(),
                completed_at,
            })
        });
        let tasks = self.tasks.iter().filter_map(|t| {
            t.completed_at.map(|completed_at| CompletedItem {
                kind: CompletedKind::Task,
                id: t.id.clone(),
                name: t.name.clone(),
                completed_at,
            })
        });
        let plans = self.plans.iter().filter_map(|p| {
            p.archived_at.map(|completed_at| CompletedItem {
                kind: CompletedKind::Plan,
                id: p.id.clone(),
                name: p.name.clone(),
                completed_at,
            })
        });

        let mut items: Vec<CompletedItem> = objectives.chain(tasks).chain(plans).collect();
        items.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        items
    }
}
