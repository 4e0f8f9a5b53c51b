use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicationId, ApplicationSubmission, DocumentStatus, MessageSender, ProcessId,
    SelectionProcess,
};
use super::evaluation::{DocumentationDecision, RubricEvaluation};
use super::export::{ExportError, ExportFormat};
use super::repository::{
    ApplicationRepository, NotificationSender, ProcessRepository, RepositoryError,
};
use super::service::{SelectionService, SelectionServiceError};

type Shared<P, R, N> = State<Arc<SelectionService<P, R, N>>>;

#[derive(Debug, Deserialize)]
pub struct DocumentReviewRequest {
    pub document: String,
    pub status: DocumentStatus,
}

#[derive(Debug, Deserialize)]
pub struct DocumentRejectionRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub reader: MessageSender,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Router exposing the selection process back office and candidate portal endpoints.
pub fn selection_router<P, R, N>(service: Arc<SelectionService<P, R, N>>) -> Router
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    Router::new()
        .route(
            "/api/v1/processes",
            get(list_processes_handler::<P, R, N>).post(register_process_handler::<P, R, N>),
        )
        .route(
            "/api/v1/processes/:process_id",
            get(process_handler::<P, R, N>),
        )
        .route(
            "/api/v1/processes/:process_id/applications",
            get(process_applications_handler::<P, R, N>),
        )
        .route(
            "/api/v1/processes/:process_id/ranking",
            get(ranking_handler::<P, R, N>),
        )
        .route(
            "/api/v1/processes/:process_id/ranking/export",
            get(export_handler::<P, R, N>),
        )
        .route(
            "/api/v1/processes/:process_id/summary",
            get(summary_handler::<P, R, N>),
        )
        .route("/api/v1/applications", post(submit_handler::<P, R, N>))
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/candidate",
            get(candidate_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/documents/review",
            post(review_document_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/documents/approve",
            post(approve_documents_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/documents/reject",
            post(reject_documents_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/documentation-decision",
            post(documentation_decision_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/documentation-decision/resend",
            post(resend_notice_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/evaluation",
            post(evaluate_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/messages",
            post(message_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/replies",
            post(reply_handler::<P, R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/messages/read",
            post(mark_read_handler::<P, R, N>),
        )
        .with_state(service)
}

/// Status code for a service failure.
pub fn status_for(error: &SelectionServiceError) -> StatusCode {
    match error {
        SelectionServiceError::Validation(_)
        | SelectionServiceError::Export(ExportError::EmptyRanking(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SelectionServiceError::Transition(_)
        | SelectionServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        SelectionServiceError::ProcessNotFound(_)
        | SelectionServiceError::ApplicationNotFound(_)
        | SelectionServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SelectionServiceError::Repository(RepositoryError::Unavailable(_))
        | SelectionServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(error: SelectionServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, SelectionServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn register_process_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    axum::Json(process): axum::Json<SelectionProcess>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    respond(StatusCode::CREATED, service.register_process(process))
}

pub(crate) async fn list_processes_handler<P, R, N>(State(service): Shared<P, R, N>) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    respond(StatusCode::OK, service.processes())
}

pub(crate) async fn process_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(process_id): Path<String>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    respond(StatusCode::OK, service.process(&ProcessId(process_id)))
}

pub(crate) async fn process_applications_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(process_id): Path<String>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let views = service
        .applications(&ProcessId(process_id))
        .map(|applications| {
            applications
                .iter()
                .map(|application| application.status_view())
                .collect::<Vec<_>>()
        });
    respond(StatusCode::OK, views)
}

pub(crate) async fn ranking_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(process_id): Path<String>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    respond(StatusCode::OK, service.ranking(&ProcessId(process_id)))
}

pub(crate) async fn export_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(process_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.export_ranking(&ProcessId(process_id), query.format) {
        Ok(artifact) => {
            let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, artifact.content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                artifact.bytes,
            )
                .into_response()
        }
        Err(error) => failure(error),
    }
}

pub(crate) async fn summary_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(process_id): Path<String>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    respond(StatusCode::OK, service.summary(&ProcessId(process_id)))
}

pub(crate) async fn submit_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let view = service
        .submit(submission)
        .map(|application| application.status_view());
    respond(StatusCode::CREATED, view)
}

pub(crate) async fn status_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let view = service
        .get(&ApplicationId(application_id))
        .map(|application| application.status_view());
    respond(StatusCode::OK, view)
}

pub(crate) async fn candidate_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    respond(
        StatusCode::OK,
        service.candidate_view(&ApplicationId(application_id)),
    )
}

pub(crate) async fn review_document_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DocumentReviewRequest>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let view = service
        .review_document(
            &ApplicationId(application_id),
            &request.document,
            request.status,
        )
        .map(|application| application.status_view());
    respond(StatusCode::OK, view)
}

pub(crate) async fn approve_documents_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let view = service
        .approve_all_documents(&ApplicationId(application_id))
        .map(|application| application.status_view());
    respond(StatusCode::OK, view)
}

pub(crate) async fn reject_documents_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DocumentRejectionRequest>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let view = service
        .reject_at_document_stage(&ApplicationId(application_id), &request.reason)
        .map(|application| application.status_view());
    respond(StatusCode::OK, view)
}

pub(crate) async fn documentation_decision_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DocumentationDecision>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let receipt = service
        .record_documentation_decision(&ApplicationId(application_id), request)
        .map(|receipt| {
            json!({
                "application": receipt.application.status_view(),
                "notice": receipt.notice,
            })
        });
    respond(StatusCode::OK, receipt)
}

pub(crate) async fn resend_notice_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    respond(
        StatusCode::OK,
        service.resend_documentation_notice(&ApplicationId(application_id)),
    )
}

pub(crate) async fn evaluate_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<RubricEvaluation>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let view = service
        .evaluate(&ApplicationId(application_id), request)
        .map(|application| application.status_view());
    respond(StatusCode::OK, view)
}

pub(crate) async fn message_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<MessageRequest>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let receipt = service
        .send_message(&ApplicationId(application_id), &request.body)
        .map(|receipt| {
            json!({
                "messages": receipt.application.messages,
                "notice": receipt.notice,
            })
        });
    respond(StatusCode::CREATED, receipt)
}

pub(crate) async fn reply_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<MessageRequest>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let view = service
        .reply_as_candidate(&ApplicationId(application_id), &request.body)
        .map(|application| application.candidate_view());
    respond(StatusCode::CREATED, view)
}

pub(crate) async fn mark_read_handler<P, R, N>(
    State(service): Shared<P, R, N>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<MarkReadRequest>,
) -> Response
where
    P: ProcessRepository + 'static,
    R: ApplicationRepository + 'static,
    N: NotificationSender + 'static,
{
    let unread = service
        .mark_messages_read(&ApplicationId(application_id), request.reader)
        .map(|application| {
            json!({
                "application_id": application.id,
                "unread_messages": application.unread_messages(request.reader),
            })
        });
    respond(StatusCode::OK, unread)
}
