use super::super::domain::{
    Application, ApplicationStage, DocumentStatus, Evaluation, EvaluationOrigin, EvaluationState,
};
use super::super::validation::ValidationError;

/// Stage-gate violations. The application is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application already has a final decision ({0})")]
    AlreadyFinal(&'static str),
    #[error("documents must be approved before {0}")]
    DocumentsNotValidated(&'static str),
    #[error("no documentation decision has been recorded")]
    NoDocumentationDecision,
}

pub(crate) fn ensure_not_final(application: &Application) -> Result<(), TransitionError> {
    match application.evaluation() {
        Some(evaluation) => Err(TransitionError::AlreadyFinal(evaluation.decision.label())),
        None => Ok(()),
    }
}

pub(crate) fn document_index(
    application: &Application,
    name: &str,
) -> Result<usize, ValidationError> {
    let wanted = name.trim();
    application
        .documents
        .iter()
        .position(|document| document.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ValidationError::UnknownDocument(wanted.to_string()))
}

/// Single-document edits never move the application stage.
pub(crate) fn review_document(
    application: &mut Application,
    index: usize,
    status: DocumentStatus,
) -> Result<(), TransitionError> {
    ensure_not_final(application)?;
    if let Some(document) = application.documents.get_mut(index) {
        document.status = status;
    }
    Ok(())
}

pub(crate) fn approve_all_documents(application: &mut Application) -> Result<(), TransitionError> {
    ensure_not_final(application)?;
    for document in &mut application.documents {
        document.status = DocumentStatus::Approved;
    }
    application.documents_validated = true;
    advance(application, ApplicationStage::DocumentsValidated);
    Ok(())
}

pub(crate) fn ensure_documents_validated(
    application: &Application,
    action: &'static str,
) -> Result<(), TransitionError> {
    ensure_not_final(application)?;
    if application.stage == ApplicationStage::DocumentsValidated {
        Ok(())
    } else {
        Err(TransitionError::DocumentsNotValidated(action))
    }
}

/// Rubric scoring needs validated documents; a rubric result may be overwritten.
pub(crate) fn ensure_can_score(application: &Application) -> Result<(), TransitionError> {
    match application.evaluation() {
        Some(evaluation) if evaluation.origin == EvaluationOrigin::Rubric => Ok(()),
        Some(evaluation) => Err(TransitionError::AlreadyFinal(evaluation.decision.label())),
        None => ensure_documents_validated(application, "rubric scoring"),
    }
}

pub(crate) fn finalize(application: &mut Application, evaluation: Evaluation) {
    advance(application, ApplicationStage::Evaluated);
    application.evaluation = EvaluationState::Evaluated(evaluation);
}

fn advance(application: &mut Application, stage: ApplicationStage) {
    if stage > application.stage {
        application.stage = stage;
    }
}
