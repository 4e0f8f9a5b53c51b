//! Candidate-facing letters sent through the `NotificationSender` seam.

use serde::{Deserialize, Serialize};

use super::domain::{Application, Decision};
use super::repository::Notification;

pub const DOCUMENTATION_APPROVED_SUBJECT: &str = "Documentação Aprovada - Processo Seletivo";
pub const DOCUMENTATION_REJECTED_SUBJECT: &str = "Documentação Reprovada - Processo Seletivo";
pub const NEW_MESSAGE_SUBJECT: &str = "Nova Mensagem - Processo Seletivo";

const SIGNATURE: &str = "Atenciosamente,\nComissão do Processo Seletivo";

/// Outcome of the delivery attempt that follows a committed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum NoticeDelivery {
    Delivered,
    Failed(String),
}

impl NoticeDelivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NoticeDelivery::Delivered)
    }
}

pub fn documentation_notice(
    application: &Application,
    process_title: &str,
    decision: Decision,
    opinion: &str,
    sender: &str,
) -> Notification {
    let (subject, verdict, closing) = match decision {
        Decision::Approved => (
            DOCUMENTATION_APPROVED_SUBJECT,
            "APROVADA",
            "Sua candidatura segue para a etapa de avaliação.",
        ),
        Decision::Rejected => (
            DOCUMENTATION_REJECTED_SUBJECT,
            "REPROVADA",
            "Em caso de dúvidas, entre em contato pelo portal do candidato.",
        ),
    };

    let body = format!(
        "Prezado(a) {name},\n\n\
         Informamos que a documentação enviada para o processo seletivo \"{process_title}\" foi {verdict}.\n\n\
         Parecer da comissão:\n{opinion}\n\n\
         {closing}\n\n\
         {SIGNATURE}",
        name = application.candidate.name,
    );

    Notification {
        application_id: application.id.clone(),
        sender: sender.to_string(),
        recipient: application.candidate.email.clone(),
        subject: subject.to_string(),
        body,
    }
}

pub fn message_notice(
    application: &Application,
    process_title: &str,
    message: &str,
    sender: &str,
) -> Notification {
    let body = format!(
        "Prezado(a) {name},\n\n\
         Você recebeu uma nova mensagem da comissão do processo seletivo \"{process_title}\":\n\n\
         {message}\n\n\
         Responda pelo portal do candidato.\n\n\
         {SIGNATURE}",
        name = application.candidate.name,
    );

    Notification {
        application_id: application.id.clone(),
        sender: sender.to_string(),
        recipient: application.candidate.email.clone(),
        subject: NEW_MESSAGE_SUBJECT.to_string(),
        body,
    }
}
