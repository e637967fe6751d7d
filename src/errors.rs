use std::fmt;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Input rejected before any request was issued (empty field, password mismatch).
    Validation(String),
    /// Resource not found (unknown property or report id).
    NotFound(String),
    /// Backend answered with a non-success status.
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Response body or a short description.
        message: String,
    },
    /// Transport-level failure (connection refused, timeout, bad body).
    Network(String),
    /// Backend rejected the credentials.
    Unauthorized(String),
    /// An identical request is already in flight.
    Duplicate(String),
    /// Onboarding event arrived in a step that cannot accept it.
    InvalidTransition(String),
    /// The caller cancelled the pending operation.
    Cancelled,
    /// Session storage could not be read or written.
    Storage(String),
    /// Internal error.
    Internal(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Duplicate(msg) => write!(f, "Duplicate request: {}", msg),
            AppError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            AppError::Cancelled => write!(f, "Operation cancelled"),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Static message suitable for showing inline to the user.
    ///
    /// Validation errors carry their own text; everything else collapses into
    /// a fixed string so that backend details never reach the screen.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(_) => "The requested item could not be found.".to_string(),
            AppError::Unauthorized(_) => "Please sign in to continue.".to_string(),
            AppError::Duplicate(_) => {
                "This request is already being processed. Please wait.".to_string()
            }
            AppError::Cancelled => "The operation was cancelled.".to_string(),
            AppError::WithContext { source, .. } => source.user_message(),
            AppError::Api { .. }
            | AppError::Network(_)
            | AppError::InvalidTransition(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Returns true when the root cause is a missing resource.
    pub fn is_not_found(&self) -> bool {
        match self {
            AppError::NotFound(_) => true,
            AppError::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// HTTP status carried by the root cause, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            AppError::NotFound(_) => Some(404),
            AppError::Unauthorized(_) => Some(401),
            AppError::WithContext { source, .. } => source.status(),
            _ => None,
        }
    }
}

// Cloned into every AsyncState snapshot.
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::Validation(msg) => AppError::Validation(msg.clone()),
            AppError::NotFound(msg) => AppError::NotFound(msg.clone()),
            AppError::Api { status, message } => AppError::Api {
                status: *status,
                message: message.clone(),
            },
            AppError::Network(msg) => AppError::Network(msg.clone()),
            AppError::Unauthorized(msg) => AppError::Unauthorized(msg.clone()),
            AppError::Duplicate(msg) => AppError::Duplicate(msg.clone()),
            AppError::InvalidTransition(msg) => AppError::InvalidTransition(msg.clone()),
            AppError::Cancelled => AppError::Cancelled,
            AppError::Storage(msg) => AppError::Storage(msg.clone()),
            AppError::Internal(msg) => AppError::Internal(msg.clone()),
            AppError::WithContext { source, context } => AppError::WithContext {
                source: source.clone(),
                context: context.clone(),
            },
        }
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => AppError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_root_cause() {
        let result: Result<(), AppError> = Err(AppError::NotFound("Property not found".into()));
        let err = result.context("Loading property 42").unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "Loading property 42: Not found: Property not found"
        );
    }

    #[test]
    fn test_user_message_hides_backend_details() {
        let err = AppError::Api {
            status: 500,
            message: "stack trace here".into(),
        };
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let err = AppError::Validation("Passwords do not match".into());
        assert_eq!(err.user_message(), "Passwords do not match");
    }

    #[test]
    fn test_clone_keeps_variant() {
        let err = AppError::Api {
            status: 503,
            message: "down".into(),
        };
        assert_eq!(err.clone().status(), Some(503));
    }
}
