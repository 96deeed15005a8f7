use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SettingsError {
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Search API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Task {task_id} on index {index} not published after {polls} polls")]
    TaskTimeout {
        index: String,
        task_id: i64,
        polls: u32,
    },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e.to_string())
    }
}

impl SettingsError {
    /// True when the remote side reports that the index does not exist yet.
    pub fn is_not_found(&self) -> bool {
        match self {
            SettingsError::IndexNotFound(_) => true,
            SettingsError::Api { status, .. } => *status == StatusCode::NOT_FOUND,
            _ => false,
        }
    }

    /// HTTP status of the failure, when it came from (or maps onto) a response.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            SettingsError::IndexNotFound(_) => Some(StatusCode::NOT_FOUND),
            SettingsError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
