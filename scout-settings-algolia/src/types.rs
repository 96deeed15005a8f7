use serde::{Deserialize, Serialize};

/// Task status reported once a write has been applied on every cluster node.
pub const TASK_PUBLISHED: &str = "published";

/// Response to any accepted write (settings, objects, clear, delete)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    #[serde(rename = "taskID")]
    pub task_id: i64,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "deletedAt", default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

/// Response from GET /1/indexes/{indexName}/task/{taskID}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub status: String, // "published" or "notPublished"
    #[serde(rename = "pendingTask", default)]
    pub pending_task: bool,
}

impl TaskStatusResponse {
    pub fn is_published(&self) -> bool {
        self.status == TASK_PUBLISHED
    }
}

/// Error body returned alongside non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}
