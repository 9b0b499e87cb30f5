use thiserror::Error;

/// Errors reported by the generation core.
///
/// Every variant describes a caller configuration problem. Nothing in the core
/// retries or recovers; the error is handed straight back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl GenError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type GenResult<T> = Result<T, GenError>;
