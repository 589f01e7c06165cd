use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors raised by the metrics and record layers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    /// The stored record does not match the expected shape.
    #[error("malformed student record: {reason}")]
    MalformedRecord { reason: String },

    /// A rate was requested with a zero denominator.
    #[error("rate is undefined: denominator is zero")]
    UndefinedRate,
}

impl DashboardError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }
}
