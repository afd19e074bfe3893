use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanPmtError {
    #[error("Invalid argument: {field} — {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Unsupported payment frequency: '{0}' (expected annual, semiannual, every-four-months, quarterly or monthly)")]
    UnsupportedFrequency(String),
}

impl LoanPmtError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanPmtError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
