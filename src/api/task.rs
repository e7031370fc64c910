use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{Task, TaskFields};
use crate::validation::FieldErrors;

/// Body of `POST /api/tasks` and `PUT /api/tasks/:id`. Absent or null
/// `completed` and `priority` mean `false` and `0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<i32>,
}

impl TaskRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Checks preconditions and yields the columns to write.
    pub fn validate(self) -> Result<TaskFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_non_blank("title", self.title.as_deref(), "title is required");

        errors.into_result(TaskFields {
            title: self.title.unwrap_or_default(),
            description: self.description,
            completed: self.completed.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            priority: task.priority,
            created_at: task.created_at,
        }
    }
}

/// Query string of `GET /api/tasks`. An absent filter lists every task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let request: TaskRequest = serde_json::from_value(json!({ "title": "Learn axum" })).unwrap();
        let fields = request.validate().unwrap();
        assert_eq!(fields.title, "Learn axum");
        assert_eq!(fields.description, None);
        assert!(!fields.completed);
        assert_eq!(fields.priority, 0);
    }

    #[test]
    fn null_flags_take_defaults() {
        let request: TaskRequest =
            serde_json::from_value(json!({ "title": "Ship", "completed": null, "priority": null })).unwrap();
        let fields = request.validate().unwrap();
        assert!(!fields.completed);
        assert_eq!(fields.priority, 0);
    }

    #[test]
    fn empty_title_fails_validation() {
        let request: TaskRequest = serde_json::from_value(json!({ "title": "" })).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("title is required"));
    }

    #[test]
    fn missing_title_fails_validation() {
        let request: TaskRequest = serde_json::from_value(json!({ "priority": 2 })).unwrap();
        assert!(request.validate().unwrap_err().get("title").is_some());
    }

    #[test]
    fn response_uses_camel_case() {
        let response = TaskResponse {
            id: 1,
            title: "t".to_string(),
            description: None,
            completed: false,
            priority: 2,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }
}
