use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::core::draft::{TaskPayload, TaskUpdate};
use crate::core::task::{Priority, Task, TaskType};
use crate::core::user::User;

/// Column names in the tasks and users tables.
pub mod field {
    pub const NAME: &str = "Name";
    pub const STATUS: &str = "Status";
    pub const TYPE: &str = "Type";
    pub const AREA: &str = "Area";
    pub const PRIORITY: &str = "Priority";
    pub const ASSIGNED_TO: &str = "AssignedTo";
    pub const REQUESTED_BY: &str = "RequestedBy";
    pub const COMPLETED: &str = "Completed";
    pub const COMPLETED_DATE: &str = "CompletedDate";
    pub const DUE_DATE: &str = "DueDate";
    pub const LABELS: &str = "Labels";
    pub const NOTES: &str = "Notes";
    pub const CREATED: &str = "Created";
    pub const TICKET_NUMBER: &str = "TicketNumber";
    pub const DISCORD_ID: &str = "Discord ID";
    pub const ROLE: &str = "Role";
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const NEW_TASK_STATUS: &str = "Todo";

/// One row as returned by the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// A page of a list response; `offset` is present while more pages remain.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPage {
    pub records: Vec<Record>,
    #[serde(default)]
    pub offset: Option<String>,
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn first_link(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .and_then(|links| links.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn date(fields: &Map<String, Value>, key: &str) -> Option<NaiveDate> {
    let raw = fields.get(key)?.as_str()?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date()))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Local).naive_local())
}

/// Split the comma-separated `Labels` column.
pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Map a tasks-table row to a [`Task`]. Missing columns fall back to the
/// task defaults, so bases without type/area/assignee columns still load.
pub fn record_to_task(record: &Record) -> Task {
    let f = &record.fields;

    let type_text = text(f, field::TYPE);
    let task_type = TaskType::from_keyword(&type_text).unwrap_or_else(|| {
        if !type_text.is_empty() {
            log::debug!("Unknown task type {:?} on {}", type_text, record.id);
        }
        TaskType::default()
    });

    let priority = Priority::from_keyword(&text(f, field::PRIORITY)).unwrap_or_default();

    let created = f
        .get(field::CREATED)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .or_else(|| record.created_time.as_deref().and_then(parse_timestamp))
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    Task {
        id: record.id.clone(),
        title: text(f, field::NAME),
        task_type,
        area: text(f, field::AREA),
        priority,
        assigned_to: first_link(f, field::ASSIGNED_TO),
        requested_by: first_link(f, field::REQUESTED_BY),
        completed: f.get(field::COMPLETED).and_then(Value::as_bool).unwrap_or(false),
        due: date(f, field::DUE_DATE),
        labels: split_labels(&text(f, field::LABELS)),
        notes: text(f, field::NOTES),
        created,
        completed_on: date(f, field::COMPLETED_DATE),
        ticket_number: text(f, field::TICKET_NUMBER),
    }
}

pub fn record_to_user(record: &Record) -> User {
    let f = &record.fields;
    User {
        id: record.id.clone(),
        external_id: text(f, field::DISCORD_ID),
        name: text(f, field::NAME),
        role: text(f, field::ROLE),
    }
}

/// Fields for a create request.
pub fn payload_to_fields(payload: &TaskPayload) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(field::NAME.into(), json!(payload.title));
    fields.insert(field::STATUS.into(), json!(NEW_TASK_STATUS));
    fields.insert(field::COMPLETED.into(), json!(false));

    if let Some(task_type) = payload.task_type {
        fields.insert(field::TYPE.into(), json!(task_type.as_keyword()));
    }
    if let Some(area) = payload.area.as_deref().filter(|a| !a.is_empty()) {
        fields.insert(field::AREA.into(), json!(area));
    }
    if let Some(priority) = payload.priority {
        fields.insert(field::PRIORITY.into(), json!(priority.as_keyword()));
    }
    if let Some(assignee) = &payload.assigned_to {
        fields.insert(field::ASSIGNED_TO.into(), json!([assignee]));
    }
    if let Some(requester) = &payload.requested_by {
        fields.insert(field::REQUESTED_BY.into(), json!([requester]));
    }
    if let Some(due) = payload.due {
        fields.insert(field::DUE_DATE.into(), json!(due.format(DATE_FORMAT).to_string()));
    }
    if !payload.labels.is_empty() {
        fields.insert(field::LABELS.into(), json!(payload.labels.join(", ")));
    }
    if let Some(notes) = payload.notes.as_deref().filter(|n| !n.is_empty()) {
        fields.insert(field::NOTES.into(), json!(notes));
    }
    fields
}

/// Fields for a partial update. Completing a task stamps `today` as its
/// completion date.
pub fn update_to_fields(update: &TaskUpdate, today: NaiveDate) -> Map<String, Value> {
    let mut fields = Map::new();

    if let Some(title) = &update.title {
        fields.insert(field::NAME.into(), json!(title));
    }
    if let Some(task_type) = update.task_type {
        fields.insert(field::TYPE.into(), json!(task_type.as_keyword()));
    }
    if let Some(area) = &update.area {
        fields.insert(field::AREA.into(), json!(area));
    }
    if let Some(priority) = update.priority {
        fields.insert(field::PRIORITY.into(), json!(priority.as_keyword()));
    }
    if let Some(assignee) = &update.assigned_to {
        fields.insert(field::ASSIGNED_TO.into(), links(assignee.as_deref()));
    }
    if let Some(requester) = &update.requested_by {
        fields.insert(field::REQUESTED_BY.into(), links(requester.as_deref()));
    }
    if let Some(completed) = update.completed {
        fields.insert(field::COMPLETED.into(), json!(completed));
        if completed {
            fields.insert(
                field::COMPLETED_DATE.into(),
                json!(today.format(DATE_FORMAT).to_string()),
            );
        }
    }
    if let Some(due) = &update.due {
        let value = match due {
            Some(d) => json!(d.format(DATE_FORMAT).to_string()),
            None => Value::Null,
        };
        fields.insert(field::DUE_DATE.into(), value);
    }
    if let Some(labels) = &update.labels {
        fields.insert(field::LABELS.into(), json!(labels.join(", ")));
    }
    if let Some(notes) = &update.notes {
        fields.insert(field::NOTES.into(), json!(notes));
    }
    fields
}

fn links(id: Option<&str>) -> Value {
    match id {
        Some(id) => json!([id]),
        None => json!([]),
    }
}
