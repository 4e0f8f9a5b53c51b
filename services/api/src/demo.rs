use crate::infra::{
    ApiService, InMemoryApplicationRepository, InMemoryProcessRepository,
    LoggingNotificationSender,
};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use portal_selecao::config::AppConfig;
use portal_selecao::error::AppError;
use portal_selecao::workflows::selection::{
    ApplicationSubmission, CandidateProfile, ChecklistItem, CriterionInput, Decision,
    DocumentUpload, DocumentationDecision, EvaluationConfig, ExportFormat, FixedClock,
    MessageSender, Position, PositionId, ProcessId, ProcessStatus, RubricEvaluation,
    SelectionProcess, SelectionService,
};
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) const DEMO_PROCESS_ID: &str = "pss-001-2025";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date recorded on decisions (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the candidate portal payload for every application.
    #[arg(long)]
    pub(crate) candidate_views: bool,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum RankingOutput {
    #[default]
    Table,
    Csv,
}

impl From<RankingOutput> for ExportFormat {
    fn from(value: RankingOutput) -> Self {
        match value {
            RankingOutput::Table => ExportFormat::Table,
            RankingOutput::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct RankingArgs {
    /// Output format for the ranking export
    #[arg(long, value_enum, default_value_t = RankingOutput::Table)]
    pub(crate) format: RankingOutput,
    /// Write the export to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Evaluation date recorded on decisions (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// Service over fresh in-memory stores, pinned to `today`.
pub(crate) fn demo_service(
    config: EvaluationConfig,
    today: NaiveDate,
) -> (ApiService, LoggingNotificationSender) {
    let notifier = LoggingNotificationSender::default();
    let service = SelectionService::with_clock(
        Arc::new(InMemoryProcessRepository::default()),
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(notifier.clone()),
        config,
        Arc::new(FixedClock::on(today)),
    );
    (service, notifier)
}

pub(crate) fn demo_process() -> SelectionProcess {
    let date = |month, day| NaiveDate::from_ymd_opt(2025, month, day).unwrap_or_default();
    let criterion = |id: &str, name: &str, weight: u8, description: &str| ChecklistItem {
        id: id.to_string(),
        criterion: name.to_string(),
        weight,
        description: description.to_string(),
    };

    SelectionProcess {
        id: ProcessId(DEMO_PROCESS_ID.to_string()),
        title: "Processo Seletivo Simplificado 001/2025".to_string(),
        description: "Contratação temporária de profissionais para a Secretaria de Administração"
            .to_string(),
        opens_on: date(1, 15),
        closes_on: date(2, 15),
        status: ProcessStatus::Open,
        positions: vec![
            Position {
                id: PositionId("analista-administrativo".to_string()),
                title: "Analista Administrativo".to_string(),
                department: "Secretaria de Administração".to_string(),
                openings: 2,
                salary: "R$ 3.500,00".to_string(),
                weekly_hours: "40 horas".to_string(),
                requirements: vec![
                    "Ensino superior completo".to_string(),
                    "Experiência mínima de 1 ano".to_string(),
                ],
            },
            Position {
                id: PositionId("assistente-administrativo".to_string()),
                title: "Assistente Administrativo".to_string(),
                department: "Secretaria de Administração".to_string(),
                openings: 3,
                salary: "R$ 2.200,00".to_string(),
                weekly_hours: "40 horas".to_string(),
                requirements: vec!["Ensino médio completo".to_string()],
            },
        ],
        required_documents: vec![
            "RG".to_string(),
            "CPF".to_string(),
            "Comprovante de residência".to_string(),
            "Diploma".to_string(),
        ],
        checklist: vec![
            criterion("formacao", "Formação acadêmica", 30, "Titulação compatível com o cargo"),
            criterion("experiencia", "Experiência profissional", 25, "Tempo de atuação na área"),
            criterion("conhecimento", "Conhecimento técnico", 20, "Prova prática"),
            criterion("entrevista", "Entrevista", 15, "Postura e clareza"),
            criterion("comunicacao", "Comunicação", 10, "Comunicação oral e escrita"),
        ],
    }
}

struct Candidate {
    name: &'static str,
    position: &'static str,
    outcome: Outcome,
}

enum Outcome {
    Approved([f64; 5]),
    Rejected([f64; 5], &'static str),
    RejectedDocuments(&'static str),
    AwaitingDocuments,
}

const CANDIDATES: [Candidate; 6] = [
    Candidate {
        name: "Roberto Almeida",
        position: "analista-administrativo",
        outcome: Outcome::Approved([9.5, 8.5, 9.0, 8.0, 8.5]),
    },
    Candidate {
        name: "Maria Silva",
        position: "analista-administrativo",
        outcome: Outcome::Approved([8.0, 8.5, 7.0, 9.0, 8.0]),
    },
    Candidate {
        name: "João Santos",
        position: "assistente-administrativo",
        outcome: Outcome::RejectedDocuments("Documentos ilegíveis"),
    },
    Candidate {
        name: "Ana Paula Costa",
        position: "assistente-administrativo",
        outcome: Outcome::Approved([7.5, 7.0, 8.0, 8.0, 9.0]),
    },
    Candidate {
        name: "Carlos Pereira",
        position: "analista-administrativo",
        outcome: Outcome::Rejected([5.0, 4.0, 6.0, 5.0, 6.0], "Experiência insuficiente"),
    },
    Candidate {
        name: "Fernanda Lima",
        position: "assistente-administrativo",
        outcome: Outcome::AwaitingDocuments,
    },
];

fn candidate_submission(candidate: &Candidate) -> ApplicationSubmission {
    let slug = candidate
        .name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");

    ApplicationSubmission {
        process_id: ProcessId(DEMO_PROCESS_ID.to_string()),
        position_id: Some(PositionId(candidate.position.to_string())),
        candidate: CandidateProfile {
            name: candidate.name.to_string(),
            email: format!("{slug}@email.com"),
            phone: "(11) 98765-4321".to_string(),
            national_id: "123.456.789-00".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 15),
            address: "Rua das Flores, 123 - Centro".to_string(),
        },
        documents: ["RG", "CPF", "Comprovante de residência", "Diploma"]
            .into_iter()
            .map(|name| DocumentUpload {
                name: name.to_string(),
                file_ref: format!("uploads/{slug}/{}.pdf", name.to_lowercase().replace(' ', "-")),
            })
            .collect(),
    }
}

fn rubric(decision: Decision, values: [f64; 5], reason: Option<&str>) -> RubricEvaluation {
    let process = demo_process();
    RubricEvaluation {
        decision,
        opinion: match decision {
            Decision::Approved => "Candidato atende plenamente aos requisitos do cargo.".to_string(),
            Decision::Rejected => "Candidato não atingiu o desempenho esperado.".to_string(),
        },
        rejection_reason: reason.map(str::to_string),
        scores: process
            .checklist
            .iter()
            .zip(values)
            .map(|(item, score)| CriterionInput {
                criterion_id: item.id.clone(),
                score,
                observation: String::new(),
            })
            .collect(),
    }
}

/// Register the demo process and drive every seeded candidate to its scripted outcome.
pub(crate) fn seed_demo(service: &ApiService) -> Result<ProcessId, AppError> {
    let process = service.register_process(demo_process())?;

    for candidate in &CANDIDATES {
        let application = service.submit(candidate_submission(candidate))?;
        let id = application.id;

        match candidate.outcome {
            Outcome::AwaitingDocuments => {}
            Outcome::RejectedDocuments(reason) => {
                service.reject_at_document_stage(&id, reason)?;
            }
            Outcome::Approved(values) => {
                service.approve_all_documents(&id)?;
                service.record_documentation_decision(
                    &id,
                    DocumentationDecision {
                        decision: Decision::Approved,
                        opinion: "Documentação completa e conferida.".to_string(),
                    },
                )?;
                service.evaluate(&id, rubric(Decision::Approved, values, None))?;
            }
            Outcome::Rejected(values, reason) => {
                service.approve_all_documents(&id)?;
                service.evaluate(&id, rubric(Decision::Rejected, values, Some(reason)))?;
            }
        }
    }

    Ok(process.id)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let (service, notifier) = demo_service(config.selection, today);
    let process_id = seed_demo(&service)?;

    let summary = service.summary(&process_id)?;
    println!("Selection process demo: {}", summary.title);
    println!(
        "- {} applications | {} pending | {} documents validated | {} evaluated",
        summary.total, summary.pending, summary.documents_validated, summary.evaluated
    );
    println!(
        "- {} approved | {} rejected | average approved score {}",
        summary.approved,
        summary.rejected,
        summary
            .average_approved_score
            .map(|score| format!("{score:.1}"))
            .unwrap_or_else(|| "n/a".to_string())
    );

    println!("\nApplications");
    for application in service.applications(&process_id)? {
        let view = application.status_view();
        println!(
            "  {} | {} | {} | {}",
            view.application_id.0, view.candidate_name, view.stage, view.decision_rationale
        );
        if args.candidate_views {
            match serde_json::to_string_pretty(&application.candidate_view()) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("  Candidate view unavailable: {err}"),
            }
        }
    }

    let pending = service
        .applications(&process_id)?
        .into_iter()
        .find(|application| !application.data_visible());
    if let Some(application) = pending {
        let receipt = service.send_message(
            &application.id,
            "Favor enviar os documentos pendentes pelo portal do candidato.",
        )?;
        println!(
            "\nMessage sent to {} ({} unread)",
            receipt.application.candidate.name,
            receipt.application.unread_messages(MessageSender::Candidate)
        );
    }

    println!("\nNotices dispatched");
    for notice in notifier.sent() {
        println!("  {} -> {}", notice.subject, notice.recipient);
    }

    let ranking = service.ranking(&process_id)?;
    println!(
        "\nRanking ({})",
        if ranking.ready {
            "final"
        } else {
            "partial: applications still under review"
        }
    );
    let artifact = service.export_ranking(&process_id, ExportFormat::Table)?;
    print!("{}", String::from_utf8_lossy(&artifact.bytes));

    Ok(())
}

pub(crate) fn run_ranking(args: RankingArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let (service, _) = demo_service(config.selection, today);
    let process_id = seed_demo(&service)?;

    let artifact = service.export_ranking(&process_id, args.format.into())?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &artifact.bytes)?;
            println!("Ranking written to {}", path.display());
        }
        None => print!("{}", String::from_utf8_lossy(&artifact.bytes)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 20).expect("valid date")
    }

    #[test]
    fn seeded_ranking_orders_approved_candidates() {
        let (service, _) = demo_service(EvaluationConfig::default(), today());
        let process_id = seed_demo(&service).expect("demo seeds");

        let ranking = service.ranking(&process_id).expect("ranking");
        let names: Vec<_> = ranking
            .entries
            .iter()
            .map(|entry| entry.candidate_name.as_str())
            .collect();
        assert_eq!(names, vec!["Roberto Almeida", "Maria Silva", "Ana Paula Costa"]);
        assert_eq!(ranking.entries[0].score, 88.3);
        assert_eq!(ranking.entries[2].position_title, "Assistente Administrativo");
        assert!(!ranking.ready);
    }

    #[test]
    fn seeded_process_sends_documentation_notices() {
        let (service, notifier) = demo_service(EvaluationConfig::default(), today());
        seed_demo(&service).expect("demo seeds");

        assert_eq!(notifier.sent().len(), 3);
    }

    #[test]
    fn seeded_csv_export_uses_configured_date_format() {
        let (service, _) = demo_service(EvaluationConfig::default(), today());
        let process_id = seed_demo(&service).expect("demo seeds");

        let artifact = service
            .export_ranking(&process_id, RankingOutput::Csv.into())
            .expect("export");
        let csv = String::from_utf8(artifact.bytes).expect("utf8");
        assert!(csv.contains("1,Roberto Almeida,Analista Administrativo,88.3,20/02/2025"));
    }
}
