use thiserror::Error;

/// Failures talking to the remote generation backend. Every transport,
/// status, job-level and polling problem ends up here so callers only have
/// one kind to map.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("prediction failed: {0}")]
    PredictionFailed(String),
    #[error("prediction timed out after {attempts} polls")]
    TimedOut { attempts: u32 },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum UiAgentError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transcript error: {0}")]
    Transcript(#[from] serde_json::Error),
}

pub type Result<T, E = UiAgentError> = std::result::Result<T, E>;

/// Outward signal a boundary layer should report for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    BadRequest,
    ServiceUnavailable,
    Internal,
}

impl Disposition {
    pub fn exit_code(self) -> i32 {
        match self {
            Disposition::Internal => 1,
            Disposition::BadRequest => 2,
            Disposition::ServiceUnavailable => 3,
        }
    }
}

impl UiAgentError {
    pub fn disposition(&self) -> Disposition {
        match self {
            UiAgentError::Validation(_) => Disposition::BadRequest,
            UiAgentError::Service(_) => Disposition::ServiceUnavailable,
            UiAgentError::Configuration(_) | UiAgentError::Io(_) | UiAgentError::Transcript(_) => {
                Disposition::Internal
            }
        }
    }
}

/// Rejects blank requirements before any network call is made.
pub fn validate_requirement(requirement: &str) -> Result<&str> {
    let trimmed = requirement.trim();
    if trimmed.is_empty() {
        return Err(UiAgentError::Validation("Requirement cannot be empty".into()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_requirement_is_a_bad_request() {
        let err = validate_requirement("   \n\t").unwrap_err();
        assert!(matches!(err, UiAgentError::Validation(_)));
        assert_eq!(err.disposition(), Disposition::BadRequest);
        assert_eq!(err.disposition().exit_code(), 2);
    }

    #[test]
    fn requirement_is_trimmed() {
        assert_eq!(validate_requirement("  Build a calculator ").unwrap(), "Build a calculator");
    }

    #[test]
    fn service_errors_map_to_unavailable() {
        let err: UiAgentError = ServiceError::TimedOut { attempts: 30 }.into();
        assert_eq!(err.disposition(), Disposition::ServiceUnavailable);
        assert_eq!(err.to_string(), "service error: prediction timed out after 30 polls");
    }

    #[test]
    fn configuration_errors_are_internal() {
        let err = UiAgentError::Configuration("REPLICATE_API_TOKEN is not set".into());
        assert_eq!(err.disposition(), Disposition::Internal);
        assert_eq!(err.disposition().exit_code(), 1);
    }
}
