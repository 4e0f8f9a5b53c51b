use serde::Serialize;

use super::domain::{Application, ApplicationStage, Decision, ProcessId, SelectionProcess};
use super::ranking::ranking_ready;

/// Dashboard counters for one selection process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSummary {
    pub process_id: ProcessId,
    pub title: String,
    pub status: &'static str,
    pub total: usize,
    pub pending: usize,
    pub documents_validated: usize,
    pub evaluated: usize,
    pub approved: usize,
    pub rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_approved_score: Option<f64>,
    pub ranking_ready: bool,
}

pub fn summarize(process: &SelectionProcess, applications: &[Application]) -> ProcessSummary {
    let mut summary = ProcessSummary {
        process_id: process.id.clone(),
        title: process.title.clone(),
        status: process.status.label(),
        total: applications.len(),
        pending: 0,
        documents_validated: 0,
        evaluated: 0,
        approved: 0,
        rejected: 0,
        average_approved_score: None,
        ranking_ready: ranking_ready(applications),
    };

    let mut approved_total = 0.0;
    for application in applications {
        match application.stage {
            ApplicationStage::Pending => summary.pending += 1,
            ApplicationStage::DocumentsValidated => summary.documents_validated += 1,
            ApplicationStage::Evaluated => summary.evaluated += 1,
        }

        if let Some(evaluation) = application.evaluation() {
            match evaluation.decision {
                Decision::Approved => {
                    summary.approved += 1;
                    approved_total += evaluation.ranking_score();
                }
                Decision::Rejected => summary.rejected += 1,
            }
        }
    }

    if summary.approved > 0 {
        let average = approved_total / summary.approved as f64;
        summary.average_approved_score = Some((average * 10.0).round() / 10.0);
    }

    summary
}
