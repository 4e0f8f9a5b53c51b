mod config;
pub(crate) mod policy;
mod rubric;

pub use config::EvaluationConfig;
pub use policy::TransitionError;
pub use rubric::{weighted_total, CriterionInput, MAX_RAW_SCORE};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ChecklistItem, Decision, Evaluation, EvaluationOrigin};
use super::validation::{require_text, ValidationError};

/// Evaluator input for a rubric-scored decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricEvaluation {
    pub decision: Decision,
    pub opinion: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub scores: Vec<CriterionInput>,
}

/// Reviewer verdict on the documentation itself, sent to the candidate as a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationDecision {
    pub decision: Decision,
    pub opinion: String,
}

/// Stateless evaluator that turns reviewer input into final `Evaluation` records.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    config: EvaluationConfig,
}

impl EvaluationEngine {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn validate_rubric(&self, checklist: &[ChecklistItem]) -> Result<(), ValidationError> {
        rubric::validate_rubric(checklist, &self.config)
    }

    pub fn score(
        &self,
        checklist: &[ChecklistItem],
        request: RubricEvaluation,
        today: NaiveDate,
    ) -> Result<Evaluation, ValidationError> {
        let RubricEvaluation {
            decision,
            opinion,
            rejection_reason,
            scores,
        } = request;

        let opinion = require_text(&opinion, ValidationError::MissingOpinion)?;
        let rejection_reason = match decision {
            Decision::Approved => None,
            Decision::Rejected => Some(require_text(
                rejection_reason.as_deref().unwrap_or_default(),
                ValidationError::MissingRejectionReason,
            )?),
        };

        self.validate_rubric(checklist)?;
        let scored = rubric::score_checklist(checklist, scores)?;

        Ok(Evaluation {
            decision,
            score: scored.score,
            score_total: Some(scored.score_total),
            opinion,
            rejection_reason,
            evaluated_on: today,
            origin: EvaluationOrigin::Rubric,
            checklist: scored.checklist,
        })
    }

    /// Terminal rejection entered during document review.
    pub fn document_rejection(
        &self,
        reason: &str,
        today: NaiveDate,
    ) -> Result<Evaluation, ValidationError> {
        let reason = require_text(reason, ValidationError::MissingRejectionReason)?;
        let opinion = format!("Candidatura reprovada na análise documental. Motivo: {reason}");
        Ok(rejected_without_score(opinion, reason, today))
    }

    /// Rejection carried by a documentation notice; the opinion doubles as the reason.
    pub fn documentation_rejection(
        &self,
        opinion: &str,
        today: NaiveDate,
    ) -> Result<Evaluation, ValidationError> {
        let opinion = require_text(opinion, ValidationError::MissingOpinion)?;
        Ok(rejected_without_score(opinion.clone(), opinion, today))
    }
}

fn rejected_without_score(opinion: String, reason: String, today: NaiveDate) -> Evaluation {
    Evaluation {
        decision: Decision::Rejected,
        score: 0,
        score_total: Some(0.0),
        opinion,
        rejection_reason: Some(reason),
        evaluated_on: today,
        origin: EvaluationOrigin::DocumentReview,
        checklist: Vec::new(),
    }
}
