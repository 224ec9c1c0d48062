use thiserror::Error;

use crate::resend::ResendError;

#[derive(Debug, Error)]
pub enum NudgerError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Email delivery failed: {0}")]
    Delivery(#[from] ResendError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NudgerError {
    pub fn invoice_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Invoice",
            id: id.into(),
        }
    }

    pub fn client_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Client",
            id: id.into(),
        }
    }

    pub fn template_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Template",
            id: id.into(),
        }
    }
}

pub type Result<T, E = NudgerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        assert_eq!(
            NudgerError::invoice_not_found("inv-9").to_string(),
            "Invoice not found: inv-9"
        );
        assert_eq!(
            NudgerError::template_not_found("level gentle").to_string(),
            "Template not found: level gentle"
        );
    }

    #[test]
    fn delivery_wraps_resend_error() {
        let err: NudgerError = ResendError::MissingApiKey.into();
        assert_eq!(
            err.to_string(),
            "Email delivery failed: RESEND_API_KEY is not defined"
        );
    }
}
