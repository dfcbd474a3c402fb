use std::path::PathBuf;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed booking request: {0}")]
    Malformed(String),
    #[error("`{field}` is out of range: expected {constraint}")]
    OutOfRange { field: &'static str, constraint: &'static str },
    #[error("`{field}` must not be empty")]
    Empty { field: &'static str },
    #[error("`{field}` must be a finite number")]
    NotFinite { field: &'static str },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("classifier contract violation: {0}")]
    Classifier(String),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("could not read artifact `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse artifact `{path}`: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("model feature schema mismatch: expected {expected:?}, artifact declares {found:?}")]
    SchemaMismatch { expected: Vec<String>, found: Vec<String> },
    #[error("invalid artifact: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The booking request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The prediction service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl PredictionError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<PredictionError> for InterfaceError {
    fn from(value: PredictionError) -> Self {
        match value {
            PredictionError::Validation(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            PredictionError::ServiceUnavailable(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            PredictionError::Classifier(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
