use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use portal_selecao::workflows::selection::{
    Application, ApplicationId, ApplicationRepository, Notification, NotificationError,
    NotificationSender, ProcessId, ProcessRepository, RepositoryError, SelectionProcess,
    SelectionService,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

pub(crate) type ApiService = SelectionService<
    InMemoryProcessRepository,
    InMemoryApplicationRepository,
    LoggingNotificationSender,
>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProcessRepository {
    records: Arc<Mutex<Vec<SelectionProcess>>>,
}

impl ProcessRepository for InMemoryProcessRepository {
    fn insert(&self, process: SelectionProcess) -> Result<SelectionProcess, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.iter().any(|existing| existing.id == process.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(process.clone());
        Ok(process)
    }

    fn fetch(&self, id: &ProcessId) -> Result<Option<SelectionProcess>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.iter().find(|process| &process.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<SelectionProcess>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }
}

/// Applications keyed by id, with insertion order kept for ranking ties.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
    order: Arc<Mutex<Vec<ApplicationId>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        self.order
            .lock()
            .map_err(poisoned)?
            .push(application.id.clone());
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&application.id) {
            guard.insert(application.id.clone(), application);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn list_by_process(&self, process_id: &ProcessId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        let order = self.order.lock().map_err(poisoned)?;
        Ok(order
            .iter()
            .filter_map(|id| guard.get(id))
            .filter(|application| &application.process_id == process_id)
            .cloned()
            .collect())
    }
}

/// Writes outbound notices to the log and keeps them for inspection.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotificationSender {
    outbox: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationSender for LoggingNotificationSender {
    fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            application_id = %notification.application_id.0,
            recipient = %notification.recipient,
            subject = %notification.subject,
            "notice queued"
        );
        let mut guard = self
            .outbox
            .lock()
            .map_err(|err| NotificationError::Transport(err.to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl LoggingNotificationSender {
    pub(crate) fn sent(&self) -> Vec<Notification> {
        self.outbox
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("in-memory store lock poisoned".to_string())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
