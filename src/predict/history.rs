use serde::Serialize;

use crate::core::draft::TaskPayload;
use crate::core::task::{Priority, Task, TaskType};
use crate::core::user::UserDirectory;

/// How many of the most recent tasks feed a prediction.
pub const PREDICTION_WINDOW: usize = 20;

/// Predictions below this confidence are not applied to new tasks.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Default field values for the next task, derived from history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub task_type: TaskType,
    pub area: String,
    pub assigned_to: Option<String>,
    pub priority: Priority,
    /// Share of the window that was populated, in `[0, 1]`.
    pub confidence: f64,
}

impl Default for Prediction {
    fn default() -> Self {
        Self {
            task_type: TaskType::default(),
            area: String::new(),
            assigned_to: None,
            priority: Priority::default(),
            confidence: 0.0,
        }
    }
}

impl Prediction {
    pub fn is_confident(&self) -> bool {
        self.confidence >= CONFIDENCE_THRESHOLD
    }

    /// Fill the fields the caller left unset. Returns whether the prediction
    /// was confident enough to be applied at all.
    ///
    /// The predicted assignee is skipped when it is the requester.
    pub fn apply_to(&self, payload: &mut TaskPayload) -> bool {
        if !self.is_confident() {
            return false;
        }
        payload.task_type.get_or_insert(self.task_type);
        payload.priority.get_or_insert(self.priority);
        if payload.area.is_none() && !self.area.is_empty() {
            payload.area = Some(self.area.clone());
        }
        if payload.assigned_to.is_none() && self.assigned_to != payload.requested_by {
            payload.assigned_to = self.assigned_to.clone();
        }
        true
    }
}

/// Occurrence counter that remembers first-seen order.
struct Tally<T> {
    entries: Vec<(T, usize)>,
}

impl<T: PartialEq> Tally<T> {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn add(&mut self, value: T) {
        match self.entries.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value, 1)),
        }
    }

    /// Highest count; among equal counts the value seen first.
    fn winner(self) -> Option<T> {
        let mut best: Option<(T, usize)> = None;
        for (value, count) in self.entries {
            if best.as_ref().is_none_or(|(_, top)| count > *top) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }
}

/// Predict type, area, assignee and priority for the next task.
///
/// `tasks` must be oldest-first; the last [`PREDICTION_WINDOW`] entries are
/// used. When `current_user` resolves in `users`, only tasks that user
/// requested are considered.
pub fn predict(tasks: &[Task], current_user: Option<&str>, users: &UserDirectory) -> Prediction {
    if tasks.is_empty() {
        return Prediction::default();
    }

    let requester = current_user.and_then(|id| users.find_by_external_id(id));
    let considered: Vec<&Task> = match requester {
        Some(user) => tasks
            .iter()
            .filter(|t| t.requested_by.as_deref() == Some(user.id.as_str()))
            .collect(),
        None => tasks.iter().collect(),
    };

    let window = &considered[considered.len().saturating_sub(PREDICTION_WINDOW)..];

    let mut types = Tally::new();
    let mut areas = Tally::new();
    let mut assignees = Tally::new();
    let mut priorities = Tally::new();

    for task in window {
        types.add(task.task_type);
        if !task.area.is_empty() {
            areas.add(task.area.as_str());
        }
        if let Some(assignee) = task.assigned_to.as_deref() {
            assignees.add(assignee);
        }
        priorities.add(task.priority);
    }

    let confidence = (window.len() as f64 / PREDICTION_WINDOW as f64).min(1.0);

    log::debug!(
        "Prediction over {} of {} tasks (requester resolved: {})",
        window.len(),
        tasks.len(),
        requester.is_some()
    );

    Prediction {
        task_type: types.winner().unwrap_or_default(),
        area: areas.winner().map(str::to_string).unwrap_or_default(),
        assigned_to: assignees.winner().map(str::to_string),
        priority: priorities.winner().unwrap_or_default(),
        confidence,
    }
}
