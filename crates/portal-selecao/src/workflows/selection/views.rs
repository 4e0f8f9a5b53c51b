use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    Application, ApplicationId, CandidateProfile, CriterionScore, Message, MessageSender, ProcessId,
};

#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub name: String,
    pub status: &'static str,
}

/// Back-office projection of an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub process_id: ProcessId,
    pub candidate_name: String,
    pub stage: &'static str,
    pub documents_validated: bool,
    pub data_visible: bool,
    pub decision_rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_total: Option<f64>,
    pub documents: Vec<DocumentView>,
    pub unread_messages: usize,
}

/// Result block shown to the candidate once the decision is public.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResult {
    pub decision: &'static str,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_total: Option<f64>,
    pub opinion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub evaluated_on: NaiveDate,
    pub checklist: Vec<CriterionScore>,
}

/// Candidate portal projection.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub application_id: ApplicationId,
    pub process_id: ProcessId,
    pub candidate: CandidateProfile,
    pub stage: &'static str,
    pub documents: Vec<DocumentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CandidateResult>,
    pub messages: Vec<Message>,
    pub unread_messages: usize,
}

impl Application {
    pub fn decision_rationale(&self) -> String {
        match self.evaluation() {
            Some(evaluation) => evaluation.summary(),
            None => "aguardando avaliação".to_string(),
        }
    }

    fn document_views(&self) -> Vec<DocumentView> {
        self.documents
            .iter()
            .map(|document| DocumentView {
                name: document.name.clone(),
                status: document.status.label(),
            })
            .collect()
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        let evaluation = self.evaluation();
        ApplicationStatusView {
            application_id: self.id.clone(),
            process_id: self.process_id.clone(),
            candidate_name: self.candidate.name.clone(),
            stage: self.stage.label(),
            documents_validated: self.documents_validated,
            data_visible: self.data_visible(),
            decision_rationale: self.decision_rationale(),
            score: evaluation.map(|evaluation| evaluation.score),
            score_total: evaluation.and_then(|evaluation| evaluation.score_total),
            documents: self.document_views(),
            unread_messages: self.unread_messages(MessageSender::Manager),
        }
    }

    pub fn candidate_view(&self) -> CandidateView {
        let result = self
            .evaluation()
            .filter(|_| self.data_visible())
            .map(|evaluation| CandidateResult {
                decision: evaluation.decision.label(),
                score: evaluation.score,
                score_total: evaluation.score_total,
                opinion: evaluation.opinion.clone(),
                rejection_reason: evaluation.rejection_reason.clone(),
                evaluated_on: evaluation.evaluated_on,
                checklist: evaluation.checklist.clone(),
            });

        CandidateView {
            application_id: self.id.clone(),
            process_id: self.process_id.clone(),
            candidate: self.candidate.clone(),
            stage: self.stage.label(),
            documents: self.document_views(),
            result,
            messages: self.messages.clone(),
            unread_messages: self.unread_messages(MessageSender::Candidate),
        }
    }
}
