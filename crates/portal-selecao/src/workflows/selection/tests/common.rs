use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::selection::clock::FixedClock;
use crate::workflows::selection::domain::{
    Application, ApplicationId, ApplicationSubmission, CandidateProfile, ChecklistItem, Decision,
    DocumentUpload, Position, PositionId, ProcessId, ProcessStatus, SelectionProcess,
};
use crate::workflows::selection::evaluation::{CriterionInput, RubricEvaluation};
use crate::workflows::selection::repository::{
    ApplicationRepository, Notification, NotificationError, NotificationSender,
    ProcessRepository, RepositoryError,
};
use crate::workflows::selection::{selection_router, EvaluationConfig, SelectionService};

pub(super) type TestService = SelectionService<MemoryProcesses, MemoryApplications, MemoryOutbox>;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn process_id() -> ProcessId {
    ProcessId("ps-2025-001".to_string())
}

pub(super) fn checklist() -> Vec<ChecklistItem> {
    [
        ("formacao", "Formação acadêmica", 30),
        ("experiencia", "Experiência profissional", 25),
        ("conhecimento", "Conhecimento técnico", 20),
        ("entrevista", "Entrevista", 15),
        ("comunicacao", "Comunicação", 10),
    ]
    .into_iter()
    .map(|(id, criterion, weight)| ChecklistItem {
        id: id.to_string(),
        criterion: criterion.to_string(),
        weight,
        description: String::new(),
    })
    .collect()
}

pub(super) fn process() -> SelectionProcess {
    SelectionProcess {
        id: process_id(),
        title: "Processo Seletivo Simplificado 001/2025".to_string(),
        description: "Contratação temporária para a Secretaria de Administração".to_string(),
        opens_on: NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid date"),
        closes_on: NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid date"),
        status: ProcessStatus::Open,
        positions: vec![
            Position {
                id: PositionId("analista".to_string()),
                title: "Analista Administrativo".to_string(),
                department: "Administração".to_string(),
                openings: 2,
                salary: "R$ 3.500,00".to_string(),
                weekly_hours: "40h".to_string(),
                requirements: vec!["Ensino superior completo".to_string()],
            },
            Position {
                id: PositionId("assistente".to_string()),
                title: "Assistente Administrativo".to_string(),
                department: "Administração".to_string(),
                openings: 3,
                salary: "R$ 2.100,00".to_string(),
                weekly_hours: "40h".to_string(),
                requirements: Vec::new(),
            },
        ],
        required_documents: vec!["RG".to_string(), "Diploma".to_string()],
        checklist: checklist(),
    }
}

pub(super) fn submission(name: &str) -> ApplicationSubmission {
    let slug = name.to_lowercase().replace(' ', ".");
    ApplicationSubmission {
        process_id: process_id(),
        position_id: Some(PositionId("analista".to_string())),
        candidate: CandidateProfile {
            name: name.to_string(),
            email: format!("{slug}@email.com"),
            phone: "(11) 98765-4321".to_string(),
            national_id: "123.456.789-00".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 15),
            address: "Rua das Flores, 123".to_string(),
        },
        documents: vec![
            DocumentUpload {
                name: "RG".to_string(),
                file_ref: format!("docs/{slug}/rg.pdf"),
            },
            DocumentUpload {
                name: "Diploma".to_string(),
                file_ref: format!("docs/{slug}/diploma.pdf"),
            },
        ],
    }
}

pub(super) fn scores(values: [f64; 5]) -> Vec<CriterionInput> {
    checklist()
        .into_iter()
        .zip(values)
        .map(|(item, score)| CriterionInput {
            criterion_id: item.id,
            score,
            observation: String::new(),
        })
        .collect()
}

pub(super) fn approval(values: [f64; 5]) -> RubricEvaluation {
    RubricEvaluation {
        decision: Decision::Approved,
        opinion: "Candidato atende aos requisitos do cargo.".to_string(),
        rejection_reason: None,
        scores: scores(values),
    }
}

pub(super) fn build_service() -> (TestService, Arc<MemoryApplications>, Arc<MemoryOutbox>) {
    build_service_with(MemoryOutbox::default())
}

pub(super) fn build_service_with(
    outbox: MemoryOutbox,
) -> (TestService, Arc<MemoryApplications>, Arc<MemoryOutbox>) {
    let processes = Arc::new(MemoryProcesses::default());
    let applications = Arc::new(MemoryApplications::default());
    let outbox = Arc::new(outbox);
    let service = SelectionService::with_clock(
        processes,
        applications.clone(),
        outbox.clone(),
        EvaluationConfig::default(),
        Arc::new(FixedClock::on(today())),
    );
    service
        .register_process(process())
        .expect("fixture process registers");
    (service, applications, outbox)
}

/// Submit `name` and approve every document.
pub(super) fn validated(service: &TestService, name: &str) -> ApplicationId {
    let application = service.submit(submission(name)).expect("submission accepted");
    service
        .approve_all_documents(&application.id)
        .expect("documents approve");
    application.id
}

/// Submit, validate, and score `name` as approved.
pub(super) fn approved(service: &TestService, name: &str, values: [f64; 5]) -> ApplicationId {
    let id = validated(service, name);
    service
        .evaluate(&id, approval(values))
        .expect("evaluation accepted");
    id
}

#[derive(Default)]
pub(super) struct MemoryProcesses {
    records: Mutex<Vec<SelectionProcess>>,
}

impl ProcessRepository for MemoryProcesses {
    fn insert(&self, process: SelectionProcess) -> Result<SelectionProcess, RepositoryError> {
        let mut guard = self.records.lock().expect("process mutex poisoned");
        if guard.iter().any(|existing| existing.id == process.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(process.clone());
        Ok(process)
    }

    fn fetch(&self, id: &ProcessId) -> Result<Option<SelectionProcess>, RepositoryError> {
        let guard = self.records.lock().expect("process mutex poisoned");
        Ok(guard.iter().find(|process| &process.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<SelectionProcess>, RepositoryError> {
        Ok(self.records.lock().expect("process mutex poisoned").clone())
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<Vec<Application>>,
    index: Mutex<HashMap<ApplicationId, usize>>,
}

impl MemoryApplications {
    pub(super) fn stored(&self, id: &ApplicationId) -> Application {
        self.fetch(id)
            .expect("fetch succeeds")
            .expect("application present")
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut records = self.records.lock().expect("application mutex poisoned");
        let mut index = self.index.lock().expect("index mutex poisoned");
        if index.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        index.insert(application.id.clone(), records.len());
        records.push(application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("application mutex poisoned");
        let index = self.index.lock().expect("index mutex poisoned");
        let slot = index
            .get(&application.id)
            .copied()
            .ok_or(RepositoryError::NotFound)?;
        records[slot] = application;
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let records = self.records.lock().expect("application mutex poisoned");
        let index = self.index.lock().expect("index mutex poisoned");
        Ok(index.get(id).map(|slot| records[*slot].clone()))
    }

    fn list_by_process(&self, process_id: &ProcessId) -> Result<Vec<Application>, RepositoryError> {
        let records = self.records.lock().expect("application mutex poisoned");
        Ok(records
            .iter()
            .filter(|application| &application.process_id == process_id)
            .cloned()
            .collect())
    }
}

/// Records every notice; optionally fails delivery.
#[derive(Default)]
pub(super) struct MemoryOutbox {
    sent: Mutex<Vec<Notification>>,
    failure: Option<String>,
}

impl MemoryOutbox {
    pub(super) fn failing(reason: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(reason.to_string()),
        }
    }

    pub(super) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("outbox mutex poisoned").clone()
    }
}

impl NotificationSender for MemoryOutbox {
    fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        if let Some(reason) = &self.failure {
            return Err(NotificationError::Transport(reason.clone()));
        }
        self.sent
            .lock()
            .expect("outbox mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_by_process(&self, _process_id: &ProcessId) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    selection_router(Arc::new(service))
}
