/// Unified Error Handling
///
/// Every failure a handler can hit maps to one `AppError` variant, and the
/// `ResponseError` impl turns it into the HTTP response the client sees.
///
/// Credential and token failures deliberately collapse to fixed generic
/// bodies ("wrong username/email or password", "fail", "Access Denied") so
/// the response never reveals whether the identity, the password, or the
/// token was the part that failed.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors raised by the document store layer
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// A schema-required field is missing or empty
    MissingField(&'static str),
    /// A unique field already holds the given value
    Duplicate(&'static str),
    /// A reference field points at a document that does not exist
    BrokenReference(String),
    /// Malformed document id in the request path
    InvalidId,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => {
                write!(f, "Path `{}` is required.", field)
            }
            ValidationError::Duplicate(field) => {
                write!(f, "duplicate key: `{}` must be unique", field)
            }
            ValidationError::BrokenReference(msg) => write!(f, "{}", msg),
            ValidationError::InvalidId => write!(f, "invalid id"),
        }
    }
}

impl StdError for ValidationError {}

/// Failures from the storage backend
#[derive(Debug)]
pub enum StoreError {
    NotFound,
    UniqueViolation(String),
    Connection(String),
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::UniqueViolation(msg) => write!(f, "duplicate key: {}", msg),
            StoreError::Connection(msg) => write!(f, "store connection error: {}", msg),
            StoreError::Query(msg) => write!(f, "store query error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

/// Authentication failures
///
/// Each variant corresponds to one fixed response body; see the
/// `ResponseError` impl below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login failed: unknown username/email or wrong password
    WrongCredentials,
    /// Protected request without a valid access token
    AccessDenied,
    /// Refresh or logout failed: missing, invalid, expired or reused token
    RefreshFailed,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::WrongCredentials => write!(f, "wrong username/email or password"),
            AuthError::AccessDenied => write!(f, "Access Denied"),
            AuthError::RefreshFailed => write!(f, "fail"),
        }
    }
}

impl StdError for AuthError {}

/// Server misconfiguration, surfaced as 500 rather than a client error
#[derive(Debug, Clone)]
pub enum ConfigError {
    MissingTokenSecret,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingTokenSecret => write!(f, "token signing secret is not configured"),
        }
    }
}

impl StdError for ConfigError {}

/// Central error type all handlers return
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Store(StoreError),
    Auth(AuthError),
    Config(ConfigError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AppError::Store(StoreError::UniqueViolation(error_msg))
        } else if error_msg.contains("no rows") {
            AppError::Store(StoreError::NotFound)
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            AppError::Store(StoreError::Connection(error_msg))
        } else {
            AppError::Store(StoreError::Query(error_msg))
        }
    }
}

/// JSON envelope used for store/validation/internal errors
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(message: String, code: &str, status: StatusCode) -> Self {
        Self {
            message,
            code: code.to_string(),
            status: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(e) => match e {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                // Constraint violations surface as client input errors
                StoreError::UniqueViolation(_) => StatusCode::BAD_REQUEST,
                StoreError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Auth(e) => match e {
                AuthError::AccessDenied => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            // Fixed plain-text bodies: these strings are part of the wire
            // contract and must stay identical across failure causes.
            AppError::Auth(e) => {
                tracing::warn!(error = %e, "Authentication failure");
                HttpResponse::build(status).body(e.to_string())
            }
            AppError::Config(e) => {
                tracing::error!(error = %e, "Server misconfiguration");
                HttpResponse::build(status).body("Server Error")
            }
            AppError::Store(StoreError::NotFound) => {
                HttpResponse::build(status).body("not found")
            }
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "Validation error");
                HttpResponse::build(status).json(ErrorResponse::new(
                    e.to_string(),
                    "VALIDATION_ERROR",
                    status,
                ))
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "Store error");
                let (code, message) = match e {
                    StoreError::UniqueViolation(_) => ("DUPLICATE_KEY", e.to_string()),
                    StoreError::Connection(_) => (
                        "SERVICE_UNAVAILABLE",
                        "Store temporarily unavailable".to_string(),
                    ),
                    _ => ("STORE_ERROR", "Store error occurred".to_string()),
                };
                HttpResponse::build(status).json(ErrorResponse::new(message, code, status))
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                HttpResponse::build(status).json(ErrorResponse::new(
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                    status,
                ))
            }
        }
    }
}
