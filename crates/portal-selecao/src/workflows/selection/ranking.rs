use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Application, ApplicationId, ApplicationStage, ProcessId, SelectionProcess};

/// One row of a process ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub position: usize,
    pub application_id: ApplicationId,
    pub candidate_name: String,
    pub position_title: String,
    pub score: f64,
    pub evaluated_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRanking {
    pub process_id: ProcessId,
    /// True once every application of the process has a final decision.
    pub ready: bool,
    pub entries: Vec<RankingEntry>,
}

/// Every application evaluated, and at least one application present.
pub fn ranking_ready(applications: &[Application]) -> bool {
    !applications.is_empty()
        && applications
            .iter()
            .all(|application| application.stage == ApplicationStage::Evaluated)
}

/// Approved applications of `process`, best score first.
///
/// The sort is stable, so ties keep the order in which `applications` was given.
pub fn rank_approved(process: &SelectionProcess, applications: &[Application]) -> Vec<RankingEntry> {
    let mut approved: Vec<(&Application, f64, NaiveDate)> = applications
        .iter()
        .filter(|application| application.process_id == process.id)
        .filter_map(|application| {
            application
                .evaluation()
                .filter(|_| application.is_approved())
                .map(|evaluation| {
                    (
                        application,
                        evaluation.ranking_score(),
                        evaluation.evaluated_on,
                    )
                })
        })
        .collect();

    approved.sort_by(|left, right| right.1.total_cmp(&left.1));

    approved
        .into_iter()
        .enumerate()
        .map(|(index, (application, score, evaluated_on))| RankingEntry {
            position: index + 1,
            application_id: application.id.clone(),
            candidate_name: application.candidate.name.clone(),
            position_title: position_title(process, application),
            score,
            evaluated_on,
        })
        .collect()
}

fn position_title(process: &SelectionProcess, application: &Application) -> String {
    application
        .position_id
        .as_ref()
        .and_then(|id| process.position(id))
        .or_else(|| match process.positions.as_slice() {
            [only] => Some(only),
            _ => None,
        })
        .map(|position| position.title.clone())
        .unwrap_or_else(|| process.title.clone())
}
