use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Kind of work a task represents. Stored in the `Type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskType {
    #[default]
    Task,
    Ticket,
    Bug,
    Feature,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [Self::Task, Self::Ticket, Self::Bug, Self::Feature];

    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::Task => "Tarea",
            Self::Ticket => "Ticket",
            Self::Bug => "Bug",
            Self::Feature => "Feature",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim() {
            "Tarea" | "Task" | "task" | "tarea" => Some(Self::Task),
            "Ticket" | "ticket" => Some(Self::Ticket),
            "Bug" | "bug" => Some(Self::Bug),
            "Feature" | "feature" => Some(Self::Feature),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Keyword written to the `Priority` column.
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::Low => "Baja",
            Self::Medium => "Media",
            Self::High => "Alta",
        }
    }

    /// Accepts both the stored Spanish keywords and English names.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "baja" | "low" => Some(Self::Low),
            "media" | "medium" => Some(Self::Medium),
            "alta" | "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_keyword())
    }
}

/// A task as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub task_type: TaskType,
    pub area: String,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub requested_by: Option<String>,
    pub completed: bool,
    pub due: Option<NaiveDate>,
    pub labels: Vec<String>,
    pub notes: String,
    pub created: NaiveDateTime,
    pub completed_on: Option<NaiveDate>,
    /// Formula-generated ticket reference, empty when the base has none.
    pub ticket_number: String,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            task_type: TaskType::default(),
            area: String::new(),
            priority: Priority::default(),
            assigned_to: None,
            requested_by: None,
            completed: false,
            due: None,
            labels: Vec::new(),
            notes: String::new(),
            created: chrono::Local::now().naive_local(),
            completed_on: None,
            ticket_number: String::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_keywords_roundtrip() {
        for t in TaskType::ALL {
            assert_eq!(TaskType::from_keyword(t.as_keyword()), Some(t));
        }
        assert_eq!(TaskType::from_keyword("Chore"), None);
    }

    #[test]
    fn priority_accepts_both_languages() {
        assert_eq!(Priority::from_keyword("Alta"), Some(Priority::High));
        assert_eq!(Priority::from_keyword("high"), Some(Priority::High));
        assert_eq!(Priority::from_keyword("Media"), Some(Priority::Medium));
        assert_eq!(Priority::from_keyword("LOW"), Some(Priority::Low));
        assert_eq!(Priority::from_keyword("urgent"), None);
    }

    #[test]
    fn defaults_match_store_defaults() {
        let task = Task::new("rec1", "Write report");
        assert_eq!(task.task_type, TaskType::Task);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.is_active());
        assert!(task.area.is_empty());
    }
}
