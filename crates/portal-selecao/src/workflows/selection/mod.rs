//! Selection process candidate evaluation: intake, document review, rubric scoring,
//! ranking, export, and candidate messaging.

pub mod clock;
pub mod domain;
pub mod evaluation;
pub mod export;
pub mod notifications;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;
pub mod summary;
pub(crate) mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Application, ApplicationId, ApplicationStage, ApplicationSubmission, CandidateProfile,
    ChecklistItem, CriterionScore, Decision, DocumentStatus, DocumentUpload,
    DocumentationReview, Evaluation, EvaluationOrigin, EvaluationState, Message, MessageId,
    MessageSender, Position, PositionId, ProcessId, ProcessStatus, SelectionProcess,
    SubmittedDocument,
};
pub use evaluation::{
    CriterionInput, DocumentationDecision, EvaluationConfig, EvaluationEngine, RubricEvaluation,
    TransitionError, MAX_RAW_SCORE,
};
pub use export::{
    CsvExport, ExportArtifact, ExportError, ExportFormat, ExportRow, ExportSink, TableExport,
    EXPORT_HEADERS,
};
pub use notifications::NoticeDelivery;
pub use ranking::{ProcessRanking, RankingEntry};
pub use repository::{
    ApplicationRepository, Notification, NotificationError, NotificationSender,
    ProcessRepository, RepositoryError,
};
pub use router::selection_router;
pub use service::{NoticeReceipt, SelectionService, SelectionServiceError};
pub use summary::ProcessSummary;
pub use validation::ValidationError;
pub use views::{ApplicationStatusView, CandidateResult, CandidateView, DocumentView};
