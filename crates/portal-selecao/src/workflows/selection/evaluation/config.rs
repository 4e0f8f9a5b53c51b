use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_EXPORT_DATE_FORMAT, DEFAULT_NOTIFICATION_FROM};

/// Policy dials for rubric checks, candidate notices, and ranking exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub enforce_weight_total: bool,
    pub export_date_format: String,
    pub notification_from: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            enforce_weight_total: true,
            export_date_format: DEFAULT_EXPORT_DATE_FORMAT.to_string(),
            notification_from: DEFAULT_NOTIFICATION_FROM.to_string(),
        }
    }
}
