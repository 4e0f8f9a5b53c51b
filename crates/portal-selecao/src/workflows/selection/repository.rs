use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationId, ProcessId, SelectionProcess};

/// Storage abstraction for applications so the service can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    /// Whole-record replacement of an existing application.
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// Applications of one process in submission order.
    fn list_by_process(&self, process_id: &ProcessId) -> Result<Vec<Application>, RepositoryError>;
}

/// Registry of selection processes.
pub trait ProcessRepository: Send + Sync {
    fn insert(&self, process: SelectionProcess) -> Result<SelectionProcess, RepositoryError>;
    fn fetch(&self, id: &ProcessId) -> Result<Option<SelectionProcess>, RepositoryError>;
    fn list(&self) -> Result<Vec<SelectionProcess>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound e-mail hook (SMTP relay, queue, etc.).
pub trait NotificationSender: Send + Sync {
    fn send(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Outbound message addressed to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub application_id: ApplicationId,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
