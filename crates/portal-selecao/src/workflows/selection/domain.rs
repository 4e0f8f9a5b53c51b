use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for selection processes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Open,
    InProgress,
    Closed,
}

impl ProcessStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProcessStatus::Open => "aberto",
            ProcessStatus::InProgress => "em_andamento",
            ProcessStatus::Closed => "encerrado",
        }
    }
}

/// A selection process as supplied by process administration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionProcess {
    pub id: ProcessId,
    pub title: String,
    pub description: String,
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub status: ProcessStatus,
    pub positions: Vec<Position>,
    pub required_documents: Vec<String>,
    /// Weighted rubric; empty when the process scores without criteria.
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl SelectionProcess {
    pub fn position(&self, id: &PositionId) -> Option<&Position> {
        self.positions.iter().find(|position| &position.id == id)
    }
}

/// Open role within a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub title: String,
    pub department: String,
    pub openings: u16,
    pub salary: String,
    pub weekly_hours: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// Rubric criterion with its percentage weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub criterion: String,
    pub weight: u8,
    #[serde(default)]
    pub description: String,
}

/// Candidate personal data captured at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pendente",
            DocumentStatus::Approved => "aprovado",
            DocumentStatus::Rejected => "reprovado",
        }
    }
}

/// Document attached to an application. Binary content lives in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedDocument {
    pub name: String,
    pub file_ref: String,
    pub status: DocumentStatus,
}

/// Stage of an application. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStage {
    Pending,
    DocumentsValidated,
    Evaluated,
}

impl ApplicationStage {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStage::Pending => "pendente",
            ApplicationStage::DocumentsValidated => "documentos_validos",
            ApplicationStage::Evaluated => "avaliado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Approved => "aprovado",
            Decision::Rejected => "reprovado",
        }
    }
}

/// Which path produced a final evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationOrigin {
    DocumentReview,
    Rubric,
}

/// Per-criterion score with a snapshot of the criterion as it was when scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_id: String,
    pub criterion: String,
    pub weight: u8,
    pub score: f64,
    #[serde(default)]
    pub observation: String,
}

/// Final decision recorded for an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub decision: Decision,
    pub score: u32,
    #[serde(default)]
    pub score_total: Option<f64>,
    pub opinion: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub evaluated_on: NaiveDate,
    pub origin: EvaluationOrigin,
    #[serde(default)]
    pub checklist: Vec<CriterionScore>,
}

impl Evaluation {
    /// Score used for ordering; prefers the one-decimal total.
    pub fn ranking_score(&self) -> f64 {
        self.score_total.unwrap_or(f64::from(self.score))
    }

    pub fn summary(&self) -> String {
        match (self.decision, &self.rejection_reason) {
            (Decision::Approved, _) => format!("aprovado com pontuação {:.1}", self.ranking_score()),
            (Decision::Rejected, Some(reason)) => format!("reprovado: {reason}"),
            (Decision::Rejected, None) => "reprovado".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "evaluation", rename_all = "snake_case")]
pub enum EvaluationState {
    Unevaluated,
    Evaluated(Evaluation),
}

impl EvaluationState {
    pub fn as_evaluation(&self) -> Option<&Evaluation> {
        match self {
            EvaluationState::Unevaluated => None,
            EvaluationState::Evaluated(evaluation) => Some(evaluation),
        }
    }
}

/// Verdict on the documentation that was announced to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationReview {
    pub decision: Decision,
    pub opinion: String,
    pub reviewed_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    Manager,
    Candidate,
}

impl MessageSender {
    pub const fn label(self) -> &'static str {
        match self {
            MessageSender::Manager => "gestor",
            MessageSender::Candidate => "candidato",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: MessageSender,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
}

/// One candidate's submission to a selection process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub process_id: ProcessId,
    #[serde(default)]
    pub position_id: Option<PositionId>,
    pub candidate: CandidateProfile,
    pub documents: Vec<SubmittedDocument>,
    pub stage: ApplicationStage,
    pub documents_validated: bool,
    pub evaluation: EvaluationState,
    #[serde(default)]
    pub documentation_review: Option<DocumentationReview>,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub submitted_at: DateTime<Utc>,
}

impl Application {
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_evaluation()
    }

    /// Personal data and results become visible once a final decision exists.
    pub fn data_visible(&self) -> bool {
        self.evaluation().is_some()
    }

    pub fn is_approved(&self) -> bool {
        self.evaluation()
            .map(|evaluation| evaluation.decision == Decision::Approved)
            .unwrap_or(false)
    }

    pub fn unread_messages(&self, reader: MessageSender) -> usize {
        self.messages
            .iter()
            .filter(|message| message.from != reader && !message.read)
            .count()
    }
}

/// Intake payload for a new application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub process_id: ProcessId,
    #[serde(default)]
    pub position_id: Option<PositionId>,
    pub candidate: CandidateProfile,
    pub documents: Vec<DocumentUpload>,
}

/// Reference to a document already placed in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub name: String,
    pub file_ref: String,
}
