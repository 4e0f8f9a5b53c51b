use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, ApplicationStage, ApplicationSubmission, DocumentStatus,
    EvaluationState, ProcessStatus, SelectionProcess, SubmittedDocument,
};

/// Input errors. Raised before any state is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("an opinion (parecer) is required")]
    MissingOpinion,
    #[error("a rejection reason is required")]
    MissingRejectionReason,
    #[error("message body must not be blank")]
    EmptyMessage,
    #[error("score {score} for criterion '{criterion_id}' must be between 0 and 10")]
    ScoreOutOfRange { criterion_id: String, score: f64 },
    #[error("criterion '{0}' is not part of the process rubric")]
    UnknownCriterion(String),
    #[error("criterion '{0}' was scored more than once")]
    DuplicateCriterion(String),
    #[error("criterion '{0}' has no score")]
    MissingCriterionScore(String),
    #[error("criterion '{criterion_id}' weight {weight} exceeds 100")]
    WeightOutOfRange { criterion_id: String, weight: u8 },
    #[error("rubric weights must total 100, found {0}")]
    WeightTotal(u32),
    #[error("document '{0}' is not attached to the application")]
    UnknownDocument(String),
    #[error("required document '{0}' is missing")]
    MissingRequiredDocument(String),
    #[error("selection process is {0} and does not accept applications")]
    ProcessNotOpen(&'static str),
    #[error("position '{0}' does not belong to the selection process")]
    UnknownPosition(String),
    #[error("candidate name is required")]
    MissingCandidateName,
    #[error("candidate email '{0}' is invalid")]
    InvalidEmail(String),
    #[error("rubric defines criterion '{0}' more than once")]
    DuplicateRubricCriterion(String),
}

pub(crate) fn require_text(value: &str, error: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Guard turning a raw submission into a fresh `Application`.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn application_from_submission(
        &self,
        process: &SelectionProcess,
        submission: ApplicationSubmission,
        id: ApplicationId,
        submitted_at: DateTime<Utc>,
    ) -> Result<Application, ValidationError> {
        if process.status != ProcessStatus::Open {
            return Err(ValidationError::ProcessNotOpen(process.status.label()));
        }

        let ApplicationSubmission {
            process_id,
            position_id,
            mut candidate,
            documents,
        } = submission;

        if let Some(position_id) = &position_id {
            if process.position(position_id).is_none() {
                return Err(ValidationError::UnknownPosition(position_id.0.clone()));
            }
        }

        candidate.name = require_text(&candidate.name, ValidationError::MissingCandidateName)?;
        candidate.email = candidate.email.trim().to_string();
        if !is_plausible_email(&candidate.email) {
            return Err(ValidationError::InvalidEmail(candidate.email));
        }

        let provided: HashSet<String> = documents
            .iter()
            .map(|document| document.name.trim().to_lowercase())
            .collect();
        if let Some(missing) = process
            .required_documents
            .iter()
            .find(|required| !provided.contains(&required.trim().to_lowercase()))
        {
            return Err(ValidationError::MissingRequiredDocument(missing.clone()));
        }

        let documents = documents
            .into_iter()
            .map(|upload| SubmittedDocument {
                name: upload.name.trim().to_string(),
                file_ref: upload.file_ref,
                status: DocumentStatus::Pending,
            })
            .collect();

        Ok(Application {
            id,
            process_id,
            position_id,
            candidate,
            documents,
            stage: ApplicationStage::Pending,
            documents_validated: false,
            evaluation: EvaluationState::Unevaluated,
            documentation_review: None,
            messages: Vec::new(),
            submitted_at,
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims_input() {
        assert_eq!(
            require_text("  ok  ", ValidationError::MissingOpinion),
            Ok("ok".to_string())
        );
        assert_eq!(
            require_text(" \n\t", ValidationError::MissingOpinion),
            Err(ValidationError::MissingOpinion)
        );
    }

    #[test]
    fn email_check_requires_domain() {
        assert!(is_plausible_email("maria.silva@email.com"));
        assert!(!is_plausible_email("maria.silva"));
        assert!(!is_plausible_email("@email.com"));
        assert!(!is_plausible_email("maria@localhost"));
    }
}
