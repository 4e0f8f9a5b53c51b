//! End-to-end scenarios for the selection process workflow through the public service facade
//! and HTTP router.

mod common {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use portal_selecao::workflows::selection::{
        Application, ApplicationId, ApplicationRepository, ApplicationSubmission,
        CandidateProfile, ChecklistItem, CriterionInput, Decision, DocumentUpload,
        EvaluationConfig, FixedClock, Notification, NotificationError, NotificationSender,
        Position, PositionId, ProcessId, ProcessRepository, ProcessStatus, RepositoryError,
        RubricEvaluation, SelectionProcess, SelectionService,
    };

    pub type Service = SelectionService<Processes, Applications, Outbox>;

    pub fn process_id() -> ProcessId {
        ProcessId("ps-2025-010".to_string())
    }

    pub fn process() -> SelectionProcess {
        SelectionProcess {
            id: process_id(),
            title: "Processo Seletivo 010/2025 - Saúde".to_string(),
            description: "Agentes comunitários de saúde".to_string(),
            opens_on: NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date"),
            closes_on: NaiveDate::from_ymd_opt(2025, 4, 30).expect("valid date"),
            status: ProcessStatus::Open,
            positions: vec![Position {
                id: PositionId("acs".to_string()),
                title: "Agente Comunitário de Saúde".to_string(),
                department: "Saúde".to_string(),
                openings: 10,
                salary: "R$ 2.424,00".to_string(),
                weekly_hours: "40h".to_string(),
                requirements: vec!["Residir na área de atuação".to_string()],
            }],
            required_documents: vec!["RG".to_string(), "Comprovante de residência".to_string()],
            checklist: vec![
                item("experiencia", "Experiência", 40),
                item("entrevista", "Entrevista", 35),
                item("territorio", "Conhecimento do território", 25),
            ],
        }
    }

    fn item(id: &str, criterion: &str, weight: u8) -> ChecklistItem {
        ChecklistItem {
            id: id.to_string(),
            criterion: criterion.to_string(),
            weight,
            description: String::new(),
        }
    }

    pub fn submission(name: &str) -> ApplicationSubmission {
        ApplicationSubmission {
            process_id: process_id(),
            position_id: None,
            candidate: CandidateProfile {
                name: name.to_string(),
                email: format!("{}@email.com", name.to_lowercase().replace(' ', ".")),
                phone: String::new(),
                national_id: String::new(),
                birth_date: None,
                address: String::new(),
            },
            documents: ["RG", "Comprovante de residência"]
                .into_iter()
                .map(|name| DocumentUpload {
                    name: name.to_string(),
                    file_ref: format!("uploads/{name}.pdf"),
                })
                .collect(),
        }
    }

    pub fn approval(experience: f64, interview: f64, territory: f64) -> RubricEvaluation {
        RubricEvaluation {
            decision: Decision::Approved,
            opinion: "Perfil adequado.".to_string(),
            rejection_reason: None,
            scores: [
                ("experiencia", experience),
                ("entrevista", interview),
                ("territorio", territory),
            ]
            .into_iter()
            .map(|(id, score)| CriterionInput {
                criterion_id: id.to_string(),
                score,
                observation: String::new(),
            })
            .collect(),
        }
    }

    pub fn build() -> (Service, Arc<Outbox>) {
        let outbox = Arc::new(Outbox::default());
        let service = SelectionService::with_clock(
            Arc::new(Processes::default()),
            Arc::new(Applications::default()),
            outbox.clone(),
            EvaluationConfig::default(),
            Arc::new(FixedClock::on(
                NaiveDate::from_ymd_opt(2025, 5, 2).expect("valid date"),
            )),
        );
        service.register_process(process()).expect("process registers");
        (service, outbox)
    }

    #[derive(Default)]
    pub struct Processes(Mutex<Vec<SelectionProcess>>);

    impl ProcessRepository for Processes {
        fn insert(&self, process: SelectionProcess) -> Result<SelectionProcess, RepositoryError> {
            self.0.lock().expect("mutex").push(process.clone());
            Ok(process)
        }

        fn fetch(&self, id: &ProcessId) -> Result<Option<SelectionProcess>, RepositoryError> {
            Ok(self
                .0
                .lock()
                .expect("mutex")
                .iter()
                .find(|process| &process.id == id)
                .cloned())
        }

        fn list(&self) -> Result<Vec<SelectionProcess>, RepositoryError> {
            Ok(self.0.lock().expect("mutex").clone())
        }
    }

    #[derive(Default)]
    pub struct Applications(Mutex<Vec<Application>>);

    impl ApplicationRepository for Applications {
        fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
            self.0.lock().expect("mutex").push(application.clone());
            Ok(application)
        }

        fn update(&self, application: Application) -> Result<(), RepositoryError> {
            let mut guard = self.0.lock().expect("mutex");
            let slot = guard
                .iter_mut()
                .find(|existing| existing.id == application.id)
                .ok_or(RepositoryError::NotFound)?;
            *slot = application;
            Ok(())
        }

        fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
            Ok(self
                .0
                .lock()
                .expect("mutex")
                .iter()
                .find(|application| &application.id == id)
                .cloned())
        }

        fn list_by_process(
            &self,
            process_id: &ProcessId,
        ) -> Result<Vec<Application>, RepositoryError> {
            Ok(self
                .0
                .lock()
                .expect("mutex")
                .iter()
                .filter(|application| &application.process_id == process_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub struct Outbox(Mutex<Vec<Notification>>);

    impl Outbox {
        pub fn subjects(&self) -> Vec<String> {
            self.0
                .lock()
                .expect("mutex")
                .iter()
                .map(|notification| notification.subject.clone())
                .collect()
        }
    }

    impl NotificationSender for Outbox {
        fn send(&self, notification: Notification) -> Result<(), NotificationError> {
            self.0.lock().expect("mutex").push(notification);
            Ok(())
        }
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use common::*;
use portal_selecao::workflows::selection::{
    selection_router, ApplicationStage, Decision, DocumentationDecision, ExportFormat,
};
use tower::ServiceExt;

#[test]
fn full_process_produces_ranking_and_export() {
    let (service, outbox) = build();

    let ana = service.submit(submission("Ana Ribeiro")).expect("submitted");
    let bruno = service.submit(submission("Bruno Teixeira")).expect("submitted");
    let carla = service.submit(submission("Carla Mendes")).expect("submitted");

    for application in [&ana, &bruno] {
        service
            .approve_all_documents(&application.id)
            .expect("documents approved");
        service
            .record_documentation_decision(
                &application.id,
                DocumentationDecision {
                    decision: Decision::Approved,
                    opinion: "Documentação conferida.".to_string(),
                },
            )
            .expect("notice sent");
    }
    service
        .reject_at_document_stage(&carla.id, "Comprovante de residência ilegível")
        .expect("rejected");

    assert!(!service.ranking_ready(&process_id()).expect("readiness"));

    // 8*40 + 7*35 + 9*25 = 790 tenths; 9*40 + 9*35 + 8*25 = 875 tenths
    service
        .evaluate(&ana.id, approval(8.0, 7.0, 9.0))
        .expect("ana evaluated");
    service
        .evaluate(&bruno.id, approval(9.0, 9.0, 8.0))
        .expect("bruno evaluated");

    let ranking = service.ranking(&process_id()).expect("ranking");
    assert!(ranking.ready);
    assert_eq!(ranking.entries.len(), 2);
    assert_eq!(ranking.entries[0].candidate_name, "Bruno Teixeira");
    assert_eq!(ranking.entries[0].score, 87.5);
    assert_eq!(ranking.entries[0].position_title, "Agente Comunitário de Saúde");
    assert_eq!(ranking.entries[1].candidate_name, "Ana Ribeiro");
    assert_eq!(ranking.entries[1].score, 79.0);
    assert_eq!(
        ranking.entries[0].evaluated_on,
        NaiveDate::from_ymd_opt(2025, 5, 2).expect("valid date")
    );

    let artifact = service
        .export_ranking(&process_id(), ExportFormat::Csv)
        .expect("export");
    let csv = String::from_utf8(artifact.bytes).expect("utf8");
    assert!(csv.contains("1,Bruno Teixeira,Agente Comunitário de Saúde,87.5,02/05/2025"));

    let carla = service.get(&carla.id).expect("stored");
    assert_eq!(carla.stage, ApplicationStage::Evaluated);
    assert!(carla.data_visible());
    assert_eq!(outbox.subjects().len(), 2);

    let summary = service.summary(&process_id()).expect("summary");
    assert_eq!(summary.approved, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.average_approved_score, Some(83.3));
}

#[tokio::test]
async fn http_walkthrough_reaches_candidate_view() {
    let (service, _) = build();
    let application = service.submit(submission("Ana Ribeiro")).expect("submitted");
    let service = Arc::new(service);
    let router = selection_router(service.clone());

    let response = router
        .clone()
        .oneshot(
            Request::post(format!(
                "/api/v1/applications/{}/documents/approve",
                application.id.0
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    service
        .evaluate(&application.id, approval(10.0, 10.0, 10.0))
        .expect("evaluated");

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/applications/{}/candidate", application.id.0))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let view: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(view["result"]["decision"], "aprovado");
    assert_eq!(view["result"]["score"], 100);
}
