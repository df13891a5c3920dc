/// Task request and response bodies

use serde::{Deserialize, Serialize};
use taskhub_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /tasks`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskCreate {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    pub description: String,

    /// Defaults to `new`
    #[serde(default)]
    pub status: Option<TaskStatus>,

    /// Owner; honored only when the caller is an admin
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl TaskCreate {
    /// Repository input; ownership is decided separately
    pub fn into_create_task(self) -> CreateTask {
        CreateTask {
            name: self.name,
            description: self.description,
            status: self.status.unwrap_or_default(),
        }
    }
}

/// Body of `PUT /tasks/:id`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub status: Option<TaskStatus>,
}

impl From<TaskUpdate> for UpdateTask {
    fn from(update: TaskUpdate) -> Self {
        UpdateTask {
            name: update.name,
            description: update.description,
            status: update.status,
        }
    }
}

/// Task as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRead {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub user_id: Uuid,
}

impl From<Task> for TaskRead {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            status: task.status,
            user_id: task.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_create_status_defaults_to_new() {
        let body: TaskCreate =
            serde_json::from_str(r#"{"name": "Write", "description": "Report"}"#).unwrap();
        assert!(body.user_id.is_none());

        let data = body.into_create_task();
        assert_eq!(data.status, TaskStatus::New);
    }

    #[test]
    fn test_task_create_rejects_unknown_status() {
        let result = serde_json::from_str::<TaskCreate>(
            r#"{"name": "Write", "description": "Report", "status": "archived"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_task_create_requires_description() {
        assert!(serde_json::from_str::<TaskCreate>(r#"{"name": "Write"}"#).is_err());
    }

    #[test]
    fn test_task_create_name_length() {
        let body = TaskCreate {
            name: "x".repeat(256),
            description: String::new(),
            status: None,
            user_id: None,
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_task_update_partial() {
        let body: TaskUpdate = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        let update = UpdateTask::from(body);

        assert_eq!(update.status, Some(TaskStatus::Completed));
        assert!(update.name.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_task_read_shape() {
        let owner = Uuid::new_v4();
        let read = TaskRead::from(Task {
            id: 7,
            name: "n".to_string(),
            description: "d".to_string(),
            status: TaskStatus::InProgress,
            user_id: owner,
        });

        let json = serde_json::to_value(&read).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["user_id"], owner.to_string());
    }
}
