use chrono::NaiveDate;

use super::task::{Task, TaskType};
use super::user::User;

/// Which list the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    Inbox,
    Today,
    Upcoming,
    Completed,
}

impl ListFilter {
    pub const ALL: [ListFilter; 5] = [
        Self::Inbox,
        Self::Today,
        Self::Upcoming,
        Self::Completed,
        Self::All,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Inbox => "inbox",
            Self::Today => "today",
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(Self::All),
            "inbox" => Some(Self::Inbox),
            "today" => Some(Self::Today),
            "upcoming" => Some(Self::Upcoming),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Inbox => task.is_active(),
            Self::Today => task.is_active() && task.due == Some(today),
            Self::Upcoming => task.is_active() && task.due.is_some_and(|d| d > today),
            Self::Completed => task.completed,
        }
    }
}

/// Secondary filter applied within a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Type(TaskType),
    /// Tasks assigned to the current user.
    Mine,
}

impl TypeFilter {
    /// `Mine` without a resolved current user matches everything.
    pub fn matches(&self, task: &Task, current_user: Option<&User>) -> bool {
        match self {
            Self::All => true,
            Self::Type(ty) => task.task_type == *ty,
            Self::Mine => match current_user {
                Some(user) => task.assigned_to.as_deref() == Some(user.id.as_str()),
                None => true,
            },
        }
    }
}

pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    match task.due {
        Some(due) if !task.completed => due < today,
        _ => false,
    }
}

pub fn is_due_today(task: &Task, today: NaiveDate) -> bool {
    task.due == Some(today)
}

/// Keeps input order, which is newest-first when read from the store.
pub fn filter_tasks(tasks: &[Task], filter: ListFilter, today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| filter.matches(t, today))
        .cloned()
        .collect()
}

/// Tasks on `list` narrowed by type or assignee. Completion follows the
/// list alone, so `Completed` narrowed by `Mine` keeps finished tasks.
pub fn select_tasks<'a>(
    tasks: &'a [Task],
    list: ListFilter,
    filter: &TypeFilter,
    current_user: Option<&User>,
    today: NaiveDate,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| list.matches(t, today))
        .filter(|t| filter.matches(t, current_user))
        .collect()
}

/// Counters shown next to the list headings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub active: usize,
    pub today: usize,
    pub completed: usize,
    pub tasks: usize,
    pub tickets: usize,
    pub mine: usize,
}

impl TaskCounts {
    pub fn build(tasks: &[Task], today: NaiveDate, current_user: Option<&User>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            if task.completed {
                counts.completed += 1;
                continue;
            }
            counts.active += 1;
            if is_due_today(task, today) {
                counts.today += 1;
            }
            match task.task_type {
                TaskType::Task => counts.tasks += 1,
                TaskType::Ticket => counts.tickets += 1,
                _ => {}
            }
            if let Some(user) = current_user {
                if task.assigned_to.as_deref() == Some(user.id.as_str()) {
                    counts.mine += 1;
                }
            }
        }
        counts
    }
}

/// Every label used across `tasks`, sorted and de-duplicated.
pub fn collect_labels(tasks: &[Task]) -> Vec<String> {
    let mut labels: Vec<String> = tasks
        .iter()
        .flat_map(|t| t.labels.iter())
        .filter(|l| !l.is_empty())
        .cloned()
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

/// Short due-date label: "Today", "Tomorrow", or e.g. "Mar 5".
pub fn format_due(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.format("%b %-d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn task(id: &str, due: Option<NaiveDate>, completed: bool) -> Task {
        let mut t = Task::new(id, format!("Task {}", id));
        t.due = due;
        t.completed = completed;
        t
    }

    fn sample() -> Vec<Task> {
        vec![
            task("a", Some(day(10)), false),
            task("b", Some(day(12)), false),
            task("c", Some(day(8)), false),
            task("d", None, false),
            task("e", Some(day(10)), true),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn list_filters() {
        let tasks = sample();
        let today = day(10);
        assert_eq!(ids(&filter_tasks(&tasks, ListFilter::Inbox, today)), vec!["a", "b", "c", "d"]);
        assert_eq!(ids(&filter_tasks(&tasks, ListFilter::Today, today)), vec!["a"]);
        assert_eq!(ids(&filter_tasks(&tasks, ListFilter::Upcoming, today)), vec!["b"]);
        assert_eq!(ids(&filter_tasks(&tasks, ListFilter::Completed, today)), vec!["e"]);
        assert_eq!(filter_tasks(&tasks, ListFilter::All, today).len(), 5);
    }

    #[test]
    fn overdue_ignores_completed() {
        let today = day(10);
        assert!(is_overdue(&task("x", Some(day(8)), false), today));
        assert!(!is_overdue(&task("x", Some(day(8)), true), today));
        assert!(!is_overdue(&task("x", Some(day(10)), false), today));
        assert!(!is_overdue(&task("x", None, false), today));
    }

    #[test]
    fn mine_filter_uses_assignee() {
        let mut tasks = sample();
        tasks[1].assigned_to = Some("recA".into());
        let me = User::new("recA", "1001", "Ana", "Developer");

        let mine = select_tasks(&tasks, ListFilter::Inbox, &TypeFilter::Mine, Some(&me), day(10));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "b");

        let unresolved = select_tasks(&tasks, ListFilter::Inbox, &TypeFilter::Mine, None, day(10));
        assert_eq!(unresolved.len(), 4);
    }

    #[test]
    fn mine_keeps_completed_on_completed_list() {
        let mut tasks = sample();
        tasks[4].assigned_to = Some("recA".into());
        tasks[3].assigned_to = Some("recB".into());
        let me = User::new("recA", "1001", "Ana", "Developer");

        let done = select_tasks(&tasks, ListFilter::Completed, &TypeFilter::Mine, Some(&me), day(10));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, "e");

        let all = select_tasks(&tasks, ListFilter::All, &TypeFilter::Mine, Some(&me), day(10));
        assert_eq!(all.len(), 1);
        assert!(all[0].completed);
    }

    #[test]
    fn type_filter() {
        let mut tasks = sample();
        tasks[0].task_type = TaskType::Ticket;
        tasks[4].task_type = TaskType::Ticket;
        let ticket = TypeFilter::Type(TaskType::Ticket);
        assert_eq!(select_tasks(&tasks, ListFilter::Inbox, &ticket, None, day(10)).len(), 1);
        assert_eq!(select_tasks(&tasks, ListFilter::All, &ticket, None, day(10)).len(), 2);
        assert!(!ticket.matches(&tasks[1], None));
        assert!(TypeFilter::All.matches(&tasks[1], None));
    }

    #[test]
    fn counts() {
        let mut tasks = sample();
        tasks[0].task_type = TaskType::Ticket;
        tasks[0].assigned_to = Some("recA".into());
        let me = User::new("recA", "1001", "Ana", "Developer");
        let counts = TaskCounts::build(&tasks, day(10), Some(&me));
        assert_eq!(counts.active, 4);
        assert_eq!(counts.today, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.tickets, 1);
        assert_eq!(counts.tasks, 3);
        assert_eq!(counts.mine, 1);
    }

    #[test]
    fn labels_sorted_unique() {
        let mut tasks = sample();
        tasks[0].labels = vec!["work".into(), "home".into()];
        tasks[1].labels = vec!["home".into()];
        assert_eq!(collect_labels(&tasks), vec!["home", "work"]);
    }

    #[test]
    fn due_labels() {
        let today = day(10);
        assert_eq!(format_due(day(10), today), "Today");
        assert_eq!(format_due(day(11), today), "Tomorrow");
        assert_eq!(format_due(day(5), today), "Mar 5");
    }

    #[test]
    fn filter_names() {
        assert_eq!(ListFilter::from_name("Today"), Some(ListFilter::Today));
        assert_eq!(ListFilter::from_name("done"), Some(ListFilter::Completed));
        assert_eq!(ListFilter::from_name("someday"), None);
        for list in ListFilter::ALL {
            assert_eq!(ListFilter::from_name(list.name()), Some(list));
        }
    }
}
