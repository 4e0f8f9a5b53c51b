use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::super::domain::{ChecklistItem, CriterionScore};
use super::super::validation::ValidationError;
use super::config::EvaluationConfig;

pub const MAX_RAW_SCORE: f64 = 10.0;
const FULL_WEIGHT: u32 = 100;

/// Raw score entered by the evaluator for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionInput {
    pub criterion_id: String,
    pub score: f64,
    #[serde(default)]
    pub observation: String,
}

pub(crate) struct RubricScore {
    pub checklist: Vec<CriterionScore>,
    pub score: u32,
    pub score_total: f64,
}

pub(crate) fn validate_rubric(
    items: &[ChecklistItem],
    config: &EvaluationConfig,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    let mut total: u32 = 0;

    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::DuplicateRubricCriterion(item.id.clone()));
        }
        if u32::from(item.weight) > FULL_WEIGHT {
            return Err(ValidationError::WeightOutOfRange {
                criterion_id: item.id.clone(),
                weight: item.weight,
            });
        }
        total += u32::from(item.weight);
    }

    if config.enforce_weight_total && !items.is_empty() && total != FULL_WEIGHT {
        return Err(ValidationError::WeightTotal(total));
    }

    Ok(())
}

pub(crate) fn score_checklist(
    items: &[ChecklistItem],
    inputs: Vec<CriterionInput>,
) -> Result<RubricScore, ValidationError> {
    let mut by_id: HashMap<String, CriterionInput> = HashMap::with_capacity(inputs.len());

    for input in inputs {
        let criterion_id = input.criterion_id.trim().to_string();
        if !items.iter().any(|item| item.id == criterion_id) {
            return Err(ValidationError::UnknownCriterion(criterion_id));
        }
        if !input.score.is_finite() || input.score < 0.0 || input.score > MAX_RAW_SCORE {
            return Err(ValidationError::ScoreOutOfRange {
                criterion_id,
                score: input.score,
            });
        }
        if by_id.insert(criterion_id.clone(), input).is_some() {
            return Err(ValidationError::DuplicateCriterion(criterion_id));
        }
    }

    let mut checklist = Vec::with_capacity(items.len());
    for item in items {
        let input = by_id
            .remove(&item.id)
            .ok_or_else(|| ValidationError::MissingCriterionScore(item.id.clone()))?;
        checklist.push(CriterionScore {
            criterion_id: item.id.clone(),
            criterion: item.criterion.clone(),
            weight: item.weight,
            score: input.score,
            observation: input.observation.trim().to_string(),
        });
    }

    // Σ hundredths × weight is the 0-100 total in thousandths.
    let thousandths = weighted_thousandths(&checklist);

    Ok(RubricScore {
        score: u32::try_from((thousandths + 500) / 1000).unwrap_or(u32::MAX),
        score_total: ((thousandths + 50) / 100) as f64 / 10.0,
        checklist,
    })
}

fn hundredths(score: f64) -> u64 {
    (score * 100.0).round() as u64
}

fn weighted_thousandths(scores: &[CriterionScore]) -> u64 {
    scores
        .iter()
        .map(|entry| hundredths(entry.score) * u64::from(entry.weight))
        .sum()
}

/// Unrounded weighted total on the 0-100 scale.
pub fn weighted_total(scores: &[CriterionScore]) -> f64 {
    weighted_thousandths(scores) as f64 / 1000.0
}
