use crate::core::error::SimError;
use thiserror::Error;

/// Invalid tunables or an invalid request to start or continue a session.
/// Always raised before a scheduler is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("invalid distribution for {what}: {reason}")]
    InvalidDistribution { what: &'static str, reason: String },

    #[error("period {0} continues a session, but no session has been started")]
    NoActiveSession(u32),

    #[error("period {got} submitted out of sequence, expected period {expected}")]
    OutOfSequence { expected: u32, got: u32 },

    #[error("period {period} lies beyond the session length of {total_periods} periods")]
    BeyondSession { period: u32, total_periods: u32 },
}

impl ConfigError {
    pub(crate) fn out_of_range(
        field: &'static str,
        expected: &'static str,
        value: impl ToString,
    ) -> Self {
        ConfigError::OutOfRange {
            field,
            expected,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("simulation engine fault: {0}")]
    Engine(#[from] SimError),
}
