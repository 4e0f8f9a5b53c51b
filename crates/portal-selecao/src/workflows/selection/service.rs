use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::domain::{
    Application, ApplicationId, ApplicationSubmission, Decision, DocumentStatus,
    DocumentationReview, Message, MessageId, MessageSender, ProcessId, SelectionProcess,
};
use super::evaluation::policy;
use super::evaluation::{
    DocumentationDecision, EvaluationConfig, EvaluationEngine, RubricEvaluation, TransitionError,
};
use super::export::{export_ranking, ExportArtifact, ExportError, ExportFormat, ExportSink};
use super::notifications::{documentation_notice, message_notice, NoticeDelivery};
use super::ranking::{rank_approved, ranking_ready, ProcessRanking};
use super::repository::{
    ApplicationRepository, Notification, NotificationSender, ProcessRepository, RepositoryError,
};
use super::summary::{summarize, ProcessSummary};
use super::validation::{require_text, IntakeGuard, ValidationError};
use super::views::CandidateView;

/// Service composing the registry, application store, notifier, and evaluation engine.
///
/// Every mutation is a fetch, modify, whole-record update. Callers must ensure a single
/// writer per application; no optimistic locking is performed.
pub struct SelectionService<P, R, N> {
    guard: IntakeGuard,
    processes: Arc<P>,
    applications: Arc<R>,
    notifier: Arc<N>,
    engine: Arc<EvaluationEngine>,
    clock: Arc<dyn Clock>,
}

/// A committed change plus the outcome of the notice that followed it.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeReceipt {
    pub application: Application,
    pub notice: NoticeDelivery,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static MESSAGE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("insc-{id:06}"))
}

fn next_message_id() -> MessageId {
    let id = MESSAGE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MessageId(format!("msg-{id:06}"))
}

impl<P, R, N> SelectionService<P, R, N>
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    pub fn new(
        processes: Arc<P>,
        applications: Arc<R>,
        notifier: Arc<N>,
        config: EvaluationConfig,
    ) -> Self {
        Self::with_clock(processes, applications, notifier, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        processes: Arc<P>,
        applications: Arc<R>,
        notifier: Arc<N>,
        config: EvaluationConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard: IntakeGuard,
            processes,
            applications,
            notifier,
            engine: Arc::new(EvaluationEngine::new(config)),
            clock,
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        self.engine.config()
    }

    /// Register a selection process after checking its rubric.
    pub fn register_process(
        &self,
        process: SelectionProcess,
    ) -> Result<SelectionProcess, SelectionServiceError> {
        self.engine.validate_rubric(&process.checklist)?;
        let stored = self.processes.insert(process)?;
        info!(process_id = %stored.id.0, criteria = stored.checklist.len(), "selection process registered");
        Ok(stored)
    }

    pub fn processes(&self) -> Result<Vec<SelectionProcess>, SelectionServiceError> {
        Ok(self.processes.list()?)
    }

    pub fn process(&self, process_id: &ProcessId) -> Result<SelectionProcess, SelectionServiceError> {
        self.processes
            .fetch(process_id)?
            .ok_or_else(|| SelectionServiceError::ProcessNotFound(process_id.0.clone()))
    }

    /// Submit a new application, returning the stored record.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Application, SelectionServiceError> {
        let process = self.process(&submission.process_id)?;
        let application = self.guard.application_from_submission(
            &process,
            submission,
            next_application_id(),
            self.clock.now(),
        )?;

        let stored = self.applications.insert(application)?;
        info!(
            application_id = %stored.id.0,
            process_id = %stored.process_id.0,
            documents = stored.documents.len(),
            "application submitted"
        );
        Ok(stored)
    }

    /// Fetch an application for API responses.
    pub fn get(&self, application_id: &ApplicationId) -> Result<Application, SelectionServiceError> {
        self.applications
            .fetch(application_id)?
            .ok_or_else(|| SelectionServiceError::ApplicationNotFound(application_id.0.clone()))
    }

    pub fn applications(
        &self,
        process_id: &ProcessId,
    ) -> Result<Vec<Application>, SelectionServiceError> {
        self.process(process_id)?;
        Ok(self.applications.list_by_process(process_id)?)
    }

    /// Set the status of one document. The application stage is never changed here.
    pub fn review_document(
        &self,
        application_id: &ApplicationId,
        document: &str,
        status: DocumentStatus,
    ) -> Result<Application, SelectionServiceError> {
        let mut application = self.get(application_id)?;
        let index = policy::document_index(&application, document)?;
        policy::review_document(&mut application, index, status)
            .inspect_err(|err| refused(&application, err))?;

        self.applications.update(application.clone())?;
        debug!(
            application_id = %application.id.0,
            document = %application.documents[index].name,
            status = status.label(),
            "document reviewed"
        );
        Ok(application)
    }

    /// Approve every document and open the application for rubric scoring.
    pub fn approve_all_documents(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, SelectionServiceError> {
        let mut application = self.get(application_id)?;
        policy::approve_all_documents(&mut application)
            .inspect_err(|err| refused(&application, err))?;

        self.applications.update(application.clone())?;
        info!(
            application_id = %application.id.0,
            process_id = %application.process_id.0,
            stage = application.stage.label(),
            "documents approved"
        );
        Ok(application)
    }

    /// Terminal rejection during document review; bypasses rubric scoring.
    pub fn reject_at_document_stage(
        &self,
        application_id: &ApplicationId,
        reason: &str,
    ) -> Result<Application, SelectionServiceError> {
        let today = self.clock.today();
        let evaluation = self.engine.document_rejection(reason, today)?;
        let mut application = self.get(application_id)?;
        policy::ensure_not_final(&application).inspect_err(|err| refused(&application, err))?;

        // Any earlier documentation verdict is superseded by the rejection.
        application.documentation_review = Some(DocumentationReview {
            decision: Decision::Rejected,
            opinion: reason.trim().to_string(),
            reviewed_on: today,
        });
        policy::finalize(&mut application, evaluation);
        self.applications.update(application.clone())?;
        info!(
            application_id = %application.id.0,
            process_id = %application.process_id.0,
            "application rejected at document stage"
        );
        Ok(application)
    }

    /// Record the verdict on the documentation and notify the candidate.
    ///
    /// The decision is committed before the notice is attempted; a failed notice is
    /// reported in the receipt and can be repeated with `resend_documentation_notice`.
    pub fn record_documentation_decision(
        &self,
        application_id: &ApplicationId,
        request: DocumentationDecision,
    ) -> Result<NoticeReceipt, SelectionServiceError> {
        let opinion = require_text(&request.opinion, ValidationError::MissingOpinion)?;
        let today = self.clock.today();
        let mut application = self.get(application_id)?;
        let process = self.process(&application.process_id)?;

        match request.decision {
            Decision::Approved => {
                policy::ensure_documents_validated(&application, "approving the documentation")
                    .inspect_err(|err| refused(&application, err))?;
            }
            Decision::Rejected => {
                policy::ensure_not_final(&application)
                    .inspect_err(|err| refused(&application, err))?;
                let evaluation = self.engine.documentation_rejection(&opinion, today)?;
                policy::finalize(&mut application, evaluation);
            }
        }

        application.documentation_review = Some(DocumentationReview {
            decision: request.decision,
            opinion,
            reviewed_on: today,
        });
        self.applications.update(application.clone())?;
        info!(
            application_id = %application.id.0,
            decision = request.decision.label(),
            stage = application.stage.label(),
            "documentation decision recorded"
        );

        let notice = self.documentation_notice(&application, &process)?;
        let notice = self.deliver(notice);
        Ok(NoticeReceipt {
            application,
            notice,
        })
    }

    /// Repeat the documentation notice for an already recorded decision.
    pub fn resend_documentation_notice(
        &self,
        application_id: &ApplicationId,
    ) -> Result<NoticeDelivery, SelectionServiceError> {
        let application = self.get(application_id)?;
        let process = self.process(&application.process_id)?;
        let notice = self.documentation_notice(&application, &process)?;
        Ok(self.deliver(notice))
    }

    fn documentation_notice(
        &self,
        application: &Application,
        process: &SelectionProcess,
    ) -> Result<Notification, TransitionError> {
        let review = application
            .documentation_review
            .as_ref()
            .ok_or(TransitionError::NoDocumentationDecision)?;
        Ok(documentation_notice(
            application,
            &process.title,
            review.decision,
            &review.opinion,
            &self.config().notification_from,
        ))
    }

    /// Score the application against the process rubric and record the final decision.
    pub fn evaluate(
        &self,
        application_id: &ApplicationId,
        request: RubricEvaluation,
    ) -> Result<Application, SelectionServiceError> {
        let mut application = self.get(application_id)?;
        policy::ensure_can_score(&application).inspect_err(|err| refused(&application, err))?;
        let process = self.process(&application.process_id)?;

        let evaluation = self
            .engine
            .score(&process.checklist, request, self.clock.today())?;
        let decision = evaluation.decision;
        let score_total = evaluation.ranking_score();

        policy::finalize(&mut application, evaluation);
        self.applications.update(application.clone())?;
        info!(
            application_id = %application.id.0,
            process_id = %application.process_id.0,
            decision = decision.label(),
            score_total,
            "application evaluated"
        );
        Ok(application)
    }

    /// Approved applications ordered by score, with the completeness flag.
    pub fn ranking(&self, process_id: &ProcessId) -> Result<ProcessRanking, SelectionServiceError> {
        let process = self.process(process_id)?;
        let applications = self.applications.list_by_process(process_id)?;

        Ok(ProcessRanking {
            process_id: process.id.clone(),
            ready: ranking_ready(&applications),
            entries: rank_approved(&process, &applications),
        })
    }

    pub fn ranking_ready(&self, process_id: &ProcessId) -> Result<bool, SelectionServiceError> {
        Ok(self.ranking(process_id)?.ready)
    }

    pub fn export_ranking(
        &self,
        process_id: &ProcessId,
        format: ExportFormat,
    ) -> Result<ExportArtifact, SelectionServiceError> {
        self.export_ranking_with(process_id, format.sink().as_ref())
    }

    pub fn export_ranking_with(
        &self,
        process_id: &ProcessId,
        sink: &dyn ExportSink,
    ) -> Result<ExportArtifact, SelectionServiceError> {
        let ranking = self.ranking(process_id)?;
        let artifact = export_ranking(
            process_id,
            &ranking.entries,
            sink,
            &self.config().export_date_format,
        )
        .inspect_err(|err| warn!(process_id = %process_id.0, error = %err, "ranking export refused"))?;

        info!(
            process_id = %process_id.0,
            rows = ranking.entries.len(),
            file = %artifact.file_name,
            "ranking exported"
        );
        Ok(artifact)
    }

    /// Append a manager message and notify the candidate.
    pub fn send_message(
        &self,
        application_id: &ApplicationId,
        body: &str,
    ) -> Result<NoticeReceipt, SelectionServiceError> {
        let body = require_text(body, ValidationError::EmptyMessage)?;
        let mut application = self.get(application_id)?;
        let process = self.process(&application.process_id)?;

        self.append_message(&mut application, MessageSender::Manager, body.clone())?;
        let notice = message_notice(
            &application,
            &process.title,
            &body,
            &self.config().notification_from,
        );
        let notice = self.deliver(notice);
        Ok(NoticeReceipt {
            application,
            notice,
        })
    }

    pub fn reply_as_candidate(
        &self,
        application_id: &ApplicationId,
        body: &str,
    ) -> Result<Application, SelectionServiceError> {
        let body = require_text(body, ValidationError::EmptyMessage)?;
        let mut application = self.get(application_id)?;
        self.append_message(&mut application, MessageSender::Candidate, body)?;
        Ok(application)
    }

    /// Mark every message written by the other party as read.
    pub fn mark_messages_read(
        &self,
        application_id: &ApplicationId,
        reader: MessageSender,
    ) -> Result<Application, SelectionServiceError> {
        let mut application = self.get(application_id)?;
        let mut changed = false;
        for message in &mut application.messages {
            if message.from != reader && !message.read {
                message.read = true;
                changed = true;
            }
        }

        if changed {
            self.applications.update(application.clone())?;
        }
        Ok(application)
    }

    fn append_message(
        &self,
        application: &mut Application,
        from: MessageSender,
        body: String,
    ) -> Result<(), SelectionServiceError> {
        application.messages.push(Message {
            id: next_message_id(),
            from,
            body,
            sent_at: self.clock.now(),
            read: false,
        });
        self.applications.update(application.clone())?;
        debug!(
            application_id = %application.id.0,
            from = from.label(),
            "message appended"
        );
        Ok(())
    }

    pub fn candidate_view(
        &self,
        application_id: &ApplicationId,
    ) -> Result<CandidateView, SelectionServiceError> {
        Ok(self.get(application_id)?.candidate_view())
    }

    pub fn summary(&self, process_id: &ProcessId) -> Result<ProcessSummary, SelectionServiceError> {
        let process = self.process(process_id)?;
        let applications = self.applications.list_by_process(process_id)?;
        Ok(summarize(&process, &applications))
    }

    fn deliver(&self, notification: Notification) -> NoticeDelivery {
        let application_id = notification.application_id.0.clone();
        let subject = notification.subject.clone();
        match self.notifier.send(notification) {
            Ok(()) => {
                debug!(application_id = %application_id, subject = %subject, "notice delivered");
                NoticeDelivery::Delivered
            }
            Err(err) => {
                warn!(application_id = %application_id, subject = %subject, error = %err, "notice delivery failed");
                NoticeDelivery::Failed(err.to_string())
            }
        }
    }
}

fn refused(application: &Application, err: &TransitionError) {
    debug!(
        application_id = %application.id.0,
        stage = application.stage.label(),
        error = %err,
        "transition refused"
    );
}

/// Error raised by the selection service.
#[derive(Debug, thiserror::Error)]
pub enum SelectionServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("selection process '{0}' not found")]
    ProcessNotFound(String),
    #[error("application '{0}' not found")]
    ApplicationNotFound(String),
}
