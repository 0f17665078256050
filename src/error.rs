use std::fmt;

/// Message surfaced when an error payload has a shape we do not recognise.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Message surfaced when a fetch expected a payload and got nothing.
pub const EMPTY_RESULT_MESSAGE: &str = "No result found.";

/// Errors produced by a connector invocation.
///
/// Validation variants are raised before any network call and always abort the
/// invocation. Everything else is subject to the caller's `stopOnError` policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorError {
    /// A required argument is absent or falsy.
    MissingArgument(String),
    /// An argument is present but unusable (wrong type, invalid JSON, ...).
    InvalidArgument { name: String, reason: String },
    /// The connector needs a secret and none was supplied.
    MissingSecret,
    /// A required secret field is absent or empty.
    MissingSecretField(String),
    /// The target API returned a structured error payload.
    Api(String),
    /// Network-level failure before a response was received.
    Transport(String),
    /// Error response or body whose shape we could not interpret.
    /// The detail is for operator logs only; callers see a generic message.
    Unrecognized(String),
    /// A fetch that should return a single resource returned nothing.
    EmptyResult,
}

impl ConnectorError {
    pub fn invalid_argument(name: &str, reason: impl Into<String>) -> Self {
        ConnectorError::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Validation errors abort regardless of `stopOnError`.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConnectorError::MissingArgument(_)
                | ConnectorError::InvalidArgument { .. }
                | ConnectorError::MissingSecret
                | ConnectorError::MissingSecretField(_)
        )
    }

    /// Detail worth logging for operators, if any.
    pub fn log_detail(&self) -> Option<&str> {
        match self {
            ConnectorError::Unrecognized(detail) => Some(detail),
            ConnectorError::Transport(detail) => Some(detail),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorError::MissingArgument(name) => {
                write!(f, "The '{}' argument is missing.", name)
            }
            ConnectorError::InvalidArgument { name, reason } => {
                write!(f, "The '{}' argument is invalid: {}", name, reason)
            }
            ConnectorError::MissingSecret => write!(f, "The secret is missing."),
            ConnectorError::MissingSecretField(field) => {
                write!(f, "The secret is missing the '{}' field.", field)
            }
            ConnectorError::Api(message) => write!(f, "{}", message),
            ConnectorError::Transport(message) => write!(f, "{}", message),
            ConnectorError::Unrecognized(_) => write!(f, "{}", UNKNOWN_ERROR_MESSAGE),
            ConnectorError::EmptyResult => write!(f, "{}", EMPTY_RESULT_MESSAGE),
        }
    }
}

impl std::error::Error for ConnectorError {}
