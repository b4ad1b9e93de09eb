use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::task::{Priority, TaskType};
use crate::core::user::User;

/// Role and priority hints keyed by task type and area.
///
/// Type keys use the stored type keyword (`Tarea`, `Ticket`, ...). The
/// tables can be overridden from the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionTables {
    pub type_roles: BTreeMap<String, Vec<String>>,
    pub area_roles: BTreeMap<String, Vec<String>>,
    pub type_priority: BTreeMap<String, Priority>,
}

fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for SuggestionTables {
    fn default() -> Self {
        let type_roles = BTreeMap::from([
            (TaskType::Task.as_keyword().to_string(), roles(&["Developer", "Operations"])),
            (TaskType::Ticket.as_keyword().to_string(), roles(&["Customer Success", "Operations"])),
            (TaskType::Bug.as_keyword().to_string(), roles(&["Developer"])),
            (TaskType::Feature.as_keyword().to_string(), roles(&["Developer", "CEO"])),
        ]);

        let area_roles = BTreeMap::from([
            ("IA".to_string(), roles(&["Developer", "Prompt Engineer"])),
            ("Contratos".to_string(), roles(&["Operations", "CEO"])),
            ("Dev".to_string(), roles(&["Developer"])),
            ("Operaciones".to_string(), roles(&["Operations"])),
            ("Marketing".to_string(), roles(&["Customer Success", "CEO"])),
        ]);

        let type_priority = BTreeMap::from([
            (TaskType::Task.as_keyword().to_string(), Priority::Medium),
            (TaskType::Ticket.as_keyword().to_string(), Priority::High),
            (TaskType::Bug.as_keyword().to_string(), Priority::High),
            (TaskType::Feature.as_keyword().to_string(), Priority::Medium),
        ]);

        Self {
            type_roles,
            area_roles,
            type_priority,
        }
    }
}

impl SuggestionTables {
    /// Type roles first, then area roles not already present.
    pub fn roles_for(&self, task_type: &str, area: &str) -> Vec<String> {
        let type_roles = self.type_roles.get(&type_key(task_type));
        let area_roles = if area.is_empty() {
            None
        } else {
            self.area_roles.get(area)
        };

        let mut relevant: Vec<String> = Vec::new();
        for role in type_roles.into_iter().chain(area_roles).flatten() {
            if !relevant.contains(role) {
                relevant.push(role.clone());
            }
        }
        relevant
    }

    pub fn priority_for(&self, task_type: &str) -> Priority {
        self.type_priority
            .get(&type_key(task_type))
            .copied()
            .unwrap_or_default()
    }
}

/// Known types are looked up by their stored keyword, so `Task`, `task`
/// and `Tarea` hit the same row.
fn type_key(task_type: &str) -> String {
    match TaskType::from_keyword(task_type) {
        Some(t) => t.as_keyword().to_string(),
        None => task_type.to_string(),
    }
}

/// Who to highlight and which priority to pre-fill for a task being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionSet {
    pub assignees: Vec<User>,
    pub priority: Priority,
}

impl SuggestionSet {
    pub fn is_suggested(&self, user_id: &str) -> bool {
        self.assignees.iter().any(|u| u.id == user_id)
    }
}

/// Users whose role fits the type/area, in `users` order, plus the
/// priority the type implies. Unknown types and areas contribute nothing.
pub fn suggest(
    current_type: &str,
    current_area: &str,
    users: &[User],
    tables: &SuggestionTables,
) -> SuggestionSet {
    let relevant = tables.roles_for(current_type, current_area);
    let assignees = users
        .iter()
        .filter(|u| relevant.contains(&u.role))
        .cloned()
        .collect();

    SuggestionSet {
        assignees,
        priority: tables.priority_for(current_type),
    }
}
