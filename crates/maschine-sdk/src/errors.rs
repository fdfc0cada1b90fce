use thiserror::Error;

/// Errors returned by the typed parameter getters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("'{key}' parameter expected")]
    Missing { key: String },

    #[error("'{key}' parameter must be {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{key}' parameter value {value} does not fit in {target}")]
    OutOfRange {
        key: String,
        value: f64,
        target: &'static str,
    },

    #[error("'{key}' parameter is malformed: {message}")]
    Malformed { key: String, message: String },
}

impl ParamError {
    /// Name of the parameter the error refers to
    pub fn key(&self) -> &str {
        match self {
            ParamError::Missing { key }
            | ParamError::TypeMismatch { key, .. }
            | ParamError::OutOfRange { key, .. }
            | ParamError::Malformed { key, .. } => key,
        }
    }
}

/// Errors returned by the resource registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("resource already registered: {0}")]
    Duplicate(String),

    #[error("unsupported resource: {0}")]
    Unsupported(String),
}
