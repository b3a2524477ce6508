//! Classified error taxonomy.
//!
//! Every failure that crosses the service boundary is normalized into a
//! [`ClassifiedError`]: one variant per [`ErrorKind`], each carrying a stable
//! `code`, a client-safe `message` and an optional diagnostic `cause`. The HTTP
//! status is fixed by the kind; only `Business` carries its own.

use std::error::Error;
use std::fmt;

use http::StatusCode;
use serde::Serialize;

/// Boxed lower-level failure kept for server-side diagnostics.
pub type Cause = Box<dyn Error + Send + Sync + 'static>;

/// Stable error codes (`NAMESPACE.NNN`). The namespace doubles as the
/// monitoring stage key.
pub mod codes {
    pub const SCHEMA_VALIDATION: &str = "VAL.001";
    pub const MALFORMED_BODY: &str = "VAL.002";
    pub const INVALID_IDENTIFIER: &str = "VAL.003";
    pub const INVALID_EMAIL: &str = "VAL.004";
    pub const MALFORMED_PATH: &str = "VAL.005";

    pub const TOKEN_INVALID: &str = "AUTH.001";
    pub const TOKEN_EXPIRED: &str = "AUTH.002";
    pub const TOKEN_ALGORITHM: &str = "AUTH.003";
    pub const TOKEN_SUBJECT_MISMATCH: &str = "AUTH.004";
    pub const INVALID_CREDENTIALS: &str = "AUTH.005";
    pub const MISSING_BEARER: &str = "AUTH.006";

    pub const PRINCIPAL_NOT_FOUND: &str = "BUS.001";
    pub const PRINCIPAL_EXISTS: &str = "BUS.002";
    pub const ROUTE_NOT_FOUND: &str = "BUS.003";
    pub const METHOD_NOT_ALLOWED: &str = "BUS.004";
    pub const REQUEST_REJECTED: &str = "BUS.005";

    pub const PIPELINE_FAILURE: &str = "TEC.000";
    pub const UNCLASSIFIED: &str = "TEC.001";
    pub const HASHING_FAILED: &str = "TEC.002";
    pub const SIGNING_FAILED: &str = "TEC.003";
    pub const CORRUPT_RECORD: &str = "TEC.004";

    pub const STORE_UNAVAILABLE: &str = "ADP.001";
    pub const STORE_TIMEOUT: &str = "ADP.002";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Auth,
    Business,
    Technical,
    Adapter,
}

impl ErrorKind {
    /// Name exposed in the client envelope.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Auth => "AuthError",
            ErrorKind::Business => "BusinessError",
            ErrorKind::Technical => "TechnicalError",
            ErrorKind::Adapter => "AdapterError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Auth => "auth",
            ErrorKind::Business => "business",
            ErrorKind::Technical => "technical",
            ErrorKind::Adapter => "adapter",
        };
        f.write_str(label)
    }
}

/// Field-level sub-error attached to validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifiedError {
    #[error("[{code}] {message}")]
    Validation {
        code: &'static str,
        message: String,
        details: Vec<FieldError>,
        #[source]
        cause: Option<Cause>,
    },
    #[error("[{code}] {message}")]
    Auth {
        code: &'static str,
        message: String,
        #[source]
        cause: Option<Cause>,
    },
    #[error("[{code}] {message}")]
    Business {
        code: &'static str,
        message: String,
        status: StatusCode,
        #[source]
        cause: Option<Cause>,
    },
    #[error("[{code}] {message}")]
    Technical {
        code: &'static str,
        message: String,
        #[source]
        cause: Option<Cause>,
    },
    #[error("[{code}] {message}")]
    Adapter {
        code: &'static str,
        message: String,
        #[source]
        cause: Option<Cause>,
    },
}

impl ClassifiedError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        ClassifiedError::Validation {
            code,
            message: message.into(),
            details: Vec::new(),
            cause: None,
        }
    }

    pub fn auth(code: &'static str, message: impl Into<String>) -> Self {
        ClassifiedError::Auth {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// Business error with the default 500 status; see [`Self::with_status`].
    pub fn business(code: &'static str, message: impl Into<String>) -> Self {
        ClassifiedError::Business {
            code,
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            cause: None,
        }
    }

    pub fn technical(code: &'static str, message: impl Into<String>) -> Self {
        ClassifiedError::Technical {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn adapter(code: &'static str, message: impl Into<String>) -> Self {
        ClassifiedError::Adapter {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// Override the status of a `Business` error. Other kinds keep their
    /// fixed status.
    pub fn with_status(mut self, new_status: StatusCode) -> Self {
        if let ClassifiedError::Business { status, .. } = &mut self {
            *status = new_status;
        }
        self
    }

    /// Attach field-level details. Ignored for kinds other than `Validation`.
    pub fn with_details(mut self, new_details: Vec<FieldError>) -> Self {
        if let ClassifiedError::Validation { details, .. } = &mut self {
            *details = new_details;
        }
        self
    }

    pub fn with_cause(mut self, new_cause: impl Into<Cause>) -> Self {
        let slot = match &mut self {
            ClassifiedError::Validation { cause, .. }
            | ClassifiedError::Auth { cause, .. }
            | ClassifiedError::Business { cause, .. }
            | ClassifiedError::Technical { cause, .. }
            | ClassifiedError::Adapter { cause, .. } => cause,
        };
        *slot = Some(new_cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassifiedError::Validation { .. } => ErrorKind::Validation,
            ClassifiedError::Auth { .. } => ErrorKind::Auth,
            ClassifiedError::Business { .. } => ErrorKind::Business,
            ClassifiedError::Technical { .. } => ErrorKind::Technical,
            ClassifiedError::Adapter { .. } => ErrorKind::Adapter,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ClassifiedError::Validation { code, .. }
            | ClassifiedError::Auth { code, .. }
            | ClassifiedError::Business { code, .. }
            | ClassifiedError::Technical { code, .. }
            | ClassifiedError::Adapter { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ClassifiedError::Validation { message, .. }
            | ClassifiedError::Auth { message, .. }
            | ClassifiedError::Business { message, .. }
            | ClassifiedError::Technical { message, .. }
            | ClassifiedError::Adapter { message, .. } => message,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ClassifiedError::Validation { .. } => StatusCode::BAD_REQUEST,
            ClassifiedError::Auth { .. } => StatusCode::UNAUTHORIZED,
            ClassifiedError::Business { status, .. } => *status,
            ClassifiedError::Technical { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ClassifiedError::Adapter { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn details(&self) -> &[FieldError] {
        match self {
            ClassifiedError::Validation { details, .. } => details,
            _ => &[],
        }
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            ClassifiedError::Validation { cause, .. }
            | ClassifiedError::Auth { cause, .. }
            | ClassifiedError::Business { cause, .. }
            | ClassifiedError::Technical { cause, .. }
            | ClassifiedError::Adapter { cause, .. } => cause.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_fixed_per_kind() {
        assert_eq!(
            ClassifiedError::validation(codes::SCHEMA_VALIDATION, "bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ClassifiedError::auth(codes::TOKEN_EXPIRED, "expired").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ClassifiedError::technical(codes::UNCLASSIFIED, "boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ClassifiedError::adapter(codes::STORE_UNAVAILABLE, "down").http_status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_business_status_defaults_to_500_and_is_overridable() {
        let error = ClassifiedError::business(codes::PRINCIPAL_NOT_FOUND, "missing");
        assert_eq!(error.http_status(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = error.with_status(StatusCode::NOT_FOUND);
        assert_eq!(error.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_status_override_ignored_for_fixed_kinds() {
        let error = ClassifiedError::auth(codes::TOKEN_INVALID, "forged")
            .with_status(StatusCode::IM_A_TEAPOT);
        assert_eq!(error.http_status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_details_only_kept_for_validation() {
        let details = vec![FieldError::new("email", "invalid")];

        let validation = ClassifiedError::validation(codes::SCHEMA_VALIDATION, "bad")
            .with_details(details.clone());
        assert_eq!(validation.details(), details.as_slice());

        let technical =
            ClassifiedError::technical(codes::UNCLASSIFIED, "boom").with_details(details);
        assert!(technical.details().is_empty());
    }

    #[test]
    fn test_cause_exposed_as_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        let error = ClassifiedError::adapter(codes::STORE_UNAVAILABLE, "Store unavailable")
            .with_cause(io);

        assert_eq!(error.source().unwrap().to_string(), "socket closed");
        assert_eq!(error.to_string(), "[ADP.001] Store unavailable");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::Validation.name(), "ValidationError");
        assert_eq!(ErrorKind::Adapter.name(), "AdapterError");
        assert_eq!(ErrorKind::Business.to_string(), "business");
    }
}
