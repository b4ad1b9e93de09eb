use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task::{Priority, TaskType};

/// Structured fields extracted from one line of quick-entry text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub labels: Vec<String>,
    pub due: Option<NaiveDateTime>,
}

impl TaskDraft {
    /// False when stripping labels and the date left nothing behind.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("task title is empty")]
    EmptyTitle,
    #[error("a task cannot be assigned to the user who requested it")]
    SelfAssignment,
}

/// Fields sent to the store when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    pub labels: Vec<String>,
    pub due: Option<NaiveDate>,
    pub task_type: Option<TaskType>,
    pub area: Option<String>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
    pub requested_by: Option<String>,
    pub notes: Option<String>,
}

impl TaskPayload {
    /// The store keeps dates only, so the time of day is dropped here.
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            title: draft.title,
            labels: draft.labels,
            due: draft.due.map(|d| d.date()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.title.trim().is_empty() {
            return Err(PayloadError::EmptyTitle);
        }
        if let (Some(assignee), Some(requester)) = (&self.assigned_to, &self.requested_by) {
            if assignee == requester {
                return Err(PayloadError::SelfAssignment);
            }
        }
        Ok(())
    }
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub task_type: Option<TaskType>,
    pub area: Option<String>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the link.
    pub assigned_to: Option<Option<String>>,
    pub requested_by: Option<Option<String>>,
    pub completed: Option<bool>,
    pub due: Option<Option<NaiveDate>>,
    pub labels: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl TaskUpdate {
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
