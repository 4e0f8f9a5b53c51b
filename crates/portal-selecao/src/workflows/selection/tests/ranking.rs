use super::common::*;
use chrono::Utc;

use crate::workflows::selection::domain::{
    Application, ApplicationId, ApplicationStage, CandidateProfile, Decision, Evaluation,
    EvaluationOrigin, EvaluationState,
};
use crate::workflows::selection::ranking::{rank_approved, ranking_ready};

fn evaluated(id: &str, name: &str, decision: Decision, score: u32, total: Option<f64>) -> Application {
    Application {
        id: ApplicationId(id.to_string()),
        process_id: process_id(),
        position_id: None,
        candidate: CandidateProfile {
            name: name.to_string(),
            email: format!("{id}@email.com"),
            phone: String::new(),
            national_id: String::new(),
            birth_date: None,
            address: String::new(),
        },
        documents: Vec::new(),
        stage: ApplicationStage::Evaluated,
        documents_validated: true,
        evaluation: EvaluationState::Evaluated(Evaluation {
            decision,
            score,
            score_total: total,
            opinion: "Parecer".to_string(),
            rejection_reason: None,
            evaluated_on: today(),
            origin: EvaluationOrigin::Rubric,
            checklist: Vec::new(),
        }),
        documentation_review: None,
        messages: Vec::new(),
        submitted_at: Utc::now(),
    }
}

fn names(entries: &[crate::workflows::selection::RankingEntry]) -> Vec<&str> {
    entries
        .iter()
        .map(|entry| entry.candidate_name.as_str())
        .collect()
}

#[test]
fn ranks_approved_candidates_by_score_descending() {
    let applications = vec![
        evaluated("a", "Ana", Decision::Approved, 75, Some(75.2)),
        evaluated("b", "Bruno", Decision::Rejected, 95, Some(95.0)),
        evaluated("c", "Carla", Decision::Approved, 88, Some(88.3)),
        evaluated("d", "Daniel", Decision::Approved, 80, Some(80.0)),
    ];

    let ranking = rank_approved(&process(), &applications);

    assert_eq!(names(&ranking), vec!["Carla", "Daniel", "Ana"]);
    assert_eq!(
        ranking.iter().map(|entry| entry.position).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(ranking.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn ties_keep_input_order() {
    let applications = vec![
        evaluated("a", "Ana", Decision::Approved, 80, Some(80.0)),
        evaluated("b", "Bruno", Decision::Approved, 90, Some(90.0)),
        evaluated("c", "Carla", Decision::Approved, 80, Some(80.0)),
    ];

    let ranking = rank_approved(&process(), &applications);
    assert_eq!(names(&ranking), vec!["Bruno", "Ana", "Carla"]);
}

#[test]
fn falls_back_to_integer_score_without_total() {
    let applications = vec![
        evaluated("a", "Ana", Decision::Approved, 70, None),
        evaluated("b", "Bruno", Decision::Approved, 0, Some(71.5)),
    ];

    let ranking = rank_approved(&process(), &applications);
    assert_eq!(names(&ranking), vec!["Bruno", "Ana"]);
    assert_eq!(ranking[1].score, 70.0);
}

#[test]
fn ranking_is_idempotent() {
    let (service, _, _) = build_service();
    approved(&service, "Ana Costa", [8.0; 5]);
    approved(&service, "Bruno Lima", [9.0; 5]);
    approved(&service, "Carla Dias", [8.0; 5]);

    let first = service.ranking(&process_id()).expect("ranking");
    let second = service.ranking(&process_id()).expect("ranking");
    assert_eq!(first, second);
    assert_eq!(names(&first.entries), vec!["Bruno Lima", "Ana Costa", "Carla Dias"]);
    assert_eq!(first.entries[0].position_title, "Analista Administrativo");
}

#[test]
fn readiness_needs_every_application_evaluated() {
    let (service, _, _) = build_service();
    assert!(!service.ranking_ready(&process_id()).expect("readiness"));

    approved(&service, "Ana Costa", [8.0; 5]);
    let pending = validated(&service, "Bruno Lima");
    assert!(!service.ranking_ready(&process_id()).expect("readiness"));

    service
        .reject_at_document_stage(&pending, "Documentos ilegíveis")
        .expect("rejected");
    assert!(service.ranking_ready(&process_id()).expect("readiness"));

    let applications = vec![evaluated("a", "Ana", Decision::Approved, 80, Some(80.0))];
    assert!(ranking_ready(&applications));
    assert!(!ranking_ready(&[]));
}
